//! Context configuration.

use crate::registry::GroupKind;

/// What happens to a child when its parent icon is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildPolicy {
    /// Destroy the child along with its parent.
    Destroy,
    /// Detach the child and leave it alive.
    Detach,
}

/// Per group kind destroy behavior.
///
/// The default destroys dropdown children, which belong to their parent
/// alone, and detaches menu children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DestroyPolicy {
    pub dropdown: ChildPolicy,
    pub menu: ChildPolicy,
}

impl Default for DestroyPolicy {
    fn default() -> Self {
        Self {
            dropdown: ChildPolicy::Destroy,
            menu: ChildPolicy::Detach,
        }
    }
}

impl DestroyPolicy {
    /// Detach every child, whatever its group.
    pub fn detach_all() -> Self {
        Self {
            dropdown: ChildPolicy::Detach,
            menu: ChildPolicy::Detach,
        }
    }

    /// Destroy every child, whatever its group.
    pub fn destroy_all() -> Self {
        Self {
            dropdown: ChildPolicy::Destroy,
            menu: ChildPolicy::Destroy,
        }
    }

    /// The policy for children of the given group kind.
    pub fn for_kind(&self, kind: GroupKind) -> ChildPolicy {
        match kind {
            GroupKind::Dropdown => self.dropdown,
            GroupKind::Menu => self.menu,
        }
    }
}

/// Display order the topbar starts with.
pub const DEFAULT_DISPLAY_ORDER: i32 = 10;

/// Configuration for an [`IconContext`](crate::IconContext).
///
/// # Example
///
/// ```
/// use horizon_topbar::{ContextConfig, DestroyPolicy};
///
/// let config = ContextConfig::default()
///     .with_auto_deselect(false)
///     .with_destroy_policy(DestroyPolicy::detach_all());
/// assert!(!config.auto_deselect);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    /// Process-wide switch for auto-deselect. When off, selecting an icon
    /// never deselects another.
    pub auto_deselect: bool,
    /// What happens to children when a parent is destroyed.
    pub destroy_policy: DestroyPolicy,
    /// Whether the topbar starts visible.
    pub topbar_enabled: bool,
    /// Initial display order handed to the renderer.
    pub display_order: i32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            auto_deselect: true,
            destroy_policy: DestroyPolicy::default(),
            topbar_enabled: true,
            display_order: DEFAULT_DISPLAY_ORDER,
        }
    }
}

impl ContextConfig {
    pub fn with_auto_deselect(mut self, auto_deselect: bool) -> Self {
        self.auto_deselect = auto_deselect;
        self
    }

    pub fn with_destroy_policy(mut self, policy: DestroyPolicy) -> Self {
        self.destroy_policy = policy;
        self
    }

    pub fn with_topbar_enabled(mut self, enabled: bool) -> Self {
        self.topbar_enabled = enabled;
        self
    }

    pub fn with_display_order(mut self, order: i32) -> Self {
        self.display_order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_asymmetric() {
        let policy = DestroyPolicy::default();
        assert_eq!(policy.for_kind(GroupKind::Dropdown), ChildPolicy::Destroy);
        assert_eq!(policy.for_kind(GroupKind::Menu), ChildPolicy::Detach);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = ContextConfig::default()
            .with_topbar_enabled(false)
            .with_display_order(3)
            .with_destroy_policy(DestroyPolicy::destroy_all());
        assert!(!config.topbar_enabled);
        assert_eq!(config.display_order, 3);
        assert_eq!(config.destroy_policy.menu, ChildPolicy::Destroy);
        assert!(config.auto_deselect);
    }
}
