//! Debug visualization of the icon hierarchy.
//!
//! ```
//! use horizon_topbar::{IconContext, IconTreeDebug, TreeFormatOptions};
//!
//! let context = IconContext::new();
//! let shop = context.create_named("shop");
//! let coins = context.create_named("coins");
//! coins.join_dropdown(&shop).unwrap();
//!
//! let tree = IconTreeDebug::with_options(&context, TreeFormatOptions::minimal()).to_string();
//! assert!(tree.contains("shop"));
//! assert!(tree.contains("coins <dropdown>"));
//! ```

use std::fmt::{self, Write};

use horizon_topbar_core::IconState;

use crate::context::IconContext;
use crate::registry::{GroupKind, IconId, IconRegistry};

/// Style options for icon tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for icon tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show icon ids.
    pub show_ids: bool,
    /// Whether to show the selection state of selected icons.
    pub show_state: bool,
    /// Whether to show notice counts.
    pub show_notices: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_state: true,
            show_notices: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_state: false,
            show_notices: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing the icons of a context.
///
/// Roots are icons outside every group. Under each icon its dropdown
/// children are listed first, then its menu children. An icon that sits in
/// both a dropdown and a menu appears under both parents.
#[derive(Debug, Clone)]
pub struct IconTreeDebug {
    context: IconContext,
    options: TreeFormatOptions,
}

impl IconTreeDebug {
    /// Create a debug visualizer with default options.
    pub fn new(context: &IconContext) -> Self {
        Self::with_options(context, TreeFormatOptions::default())
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(context: &IconContext, options: TreeFormatOptions) -> Self {
        Self {
            context: context.clone(),
            options,
        }
    }

    /// Format the whole icon tree.
    pub fn format_all(&self) -> String {
        self.to_string()
    }

    /// Format the subtree under one icon.
    pub fn format_subtree(&self, root: IconId) -> String {
        let mut output = String::new();
        let registry = self.context.inner().registry.lock();
        // Writing into a String cannot fail.
        let _ = self.write_subtree(&registry, root, None, 0, true, &mut output);
        output
    }

    fn write_subtree(
        &self,
        registry: &IconRegistry,
        id: IconId,
        kind: Option<GroupKind>,
        depth: usize,
        is_last: bool,
        output: &mut impl Write,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let Some(data) = registry.icons.get(id) else {
            return Ok(());
        };

        output.write_str(&self.build_prefix(depth, is_last))?;
        output.write_str(if data.name.is_empty() { "(unnamed)" } else { &data.name })?;
        if self.options.show_ids {
            write!(output, " [{id}]")?;
        }
        if let Some(kind) = kind {
            write!(output, " <{kind}>")?;
        }
        if self.options.show_state && data.state != IconState::Deselected {
            write!(output, " ({})", data.state)?;
        }
        if self.options.show_notices {
            let displayed = registry.displayed_notices(id);
            if displayed > 0 {
                write!(output, " {{{displayed}}}")?;
            }
        }
        output.write_char('\n')?;

        let children: Vec<(GroupKind, IconId)> = GroupKind::ALL
            .into_iter()
            .flat_map(|kind| data.children(kind).iter().map(move |child| (kind, *child)))
            .collect();
        let child_count = children.len();
        for (i, (kind, child)) in children.into_iter().enumerate() {
            self.write_subtree(registry, child, Some(kind), depth + 1, i == child_count - 1, output)?;
        }
        Ok(())
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix
    }
}

impl fmt::Display for IconTreeDebug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.context.inner().registry.lock();
        let roots = registry.roots();
        writeln!(f, "Icon Tree ({} total icons):", registry.icons.len())?;

        if roots.is_empty() {
            writeln!(f, "  (empty)")?;
        }
        for root in roots {
            self.write_subtree(&registry, root, None, 0, true, &mut *f)?;
        }
        Ok(())
    }
}
