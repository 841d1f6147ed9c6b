//! The icon arena.
//!
//! Every live icon is an entry in a [`SlotMap`] keyed by [`IconId`]. Group
//! relations are stored as ids on both sides (a parent's ordered child list
//! and the child's parent link), never as owning pointers, so reassigning a
//! child is an id rewrite and destroying an icon is a single removal.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use horizon_topbar_core::{ConnectionId, IconState, Janitor, ScheduledTaskId, Subscription};
use horizon_topbar_style::schema;
use horizon_topbar_style::table::ThemeTable;
use slotmap::{SlotMap, new_key_type};

use crate::bindings::{Key, ToggleItem};
use crate::config::ContextConfig;
use crate::error::{IconError, Result};
use crate::events::{IconEvent, IconSignals};

new_key_type! {
    /// A unique identifier for an icon.
    ///
    /// Ids are generated when an icon is created and never change, even when
    /// the icon is renamed. A destroyed icon's id is never handed out again
    /// for a different icon.
    pub struct IconId;
}

impl IconId {
    /// Convert the id to a raw u64 value.
    ///
    /// The raw value can be converted back using [`IconId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create an id from a raw u64 value.
    ///
    /// This does not check that the icon exists.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

impl fmt::Display for IconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// Horizontal placement of an icon on the topbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// The two kinds of child group an icon can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// A vertical list under the icon.
    Dropdown,
    /// A horizontal strip beside the icon.
    Menu,
}

impl GroupKind {
    pub const ALL: [GroupKind; 2] = [GroupKind::Dropdown, GroupKind::Menu];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dropdown => "dropdown",
            Self::Menu => "menu",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the context knows about one icon.
pub(crate) struct IconData {
    pub(crate) name: String,
    /// Creation sequence number, used for stable ordering.
    pub(crate) created: u64,
    pub(crate) state: IconState,
    pub(crate) enabled: bool,
    pub(crate) manual_lock: bool,
    pub(crate) debounce_holds: u32,
    pub(crate) debounce_tasks: Vec<ScheduledTaskId>,
    pub(crate) notices: u32,
    pub(crate) notice_subscriptions: Vec<Subscription>,
    pub(crate) alignment: Alignment,
    pub(crate) order: i32,
    pub(crate) auto_deselect: bool,
    /// The caller's auto-deselect setting while it is suspended by group membership.
    pub(crate) saved_auto_deselect: Option<bool>,
    pub(crate) one_click: bool,
    pub(crate) toggle_keys: Vec<Key>,
    pub(crate) toggle_items: Vec<Arc<dyn ToggleItem>>,
    pub(crate) dropdown_parent: Option<IconId>,
    pub(crate) menu_parent: Option<IconId>,
    pub(crate) dropdown: Vec<IconId>,
    pub(crate) menu: Vec<IconId>,
    pub(crate) theme: ThemeTable,
    /// Overrides handed to current and future children.
    pub(crate) child_theme: ThemeTable,
    pub(crate) janitor: Janitor,
    pub(crate) signals: IconSignals,
    pub(crate) bound_events: HashMap<IconEvent, Vec<ConnectionId>>,
    /// Set while this icon's transition events are being delivered.
    pub(crate) dispatching: bool,
    /// Transitions made by callbacks during delivery, delivered next.
    pub(crate) queued_emits: VecDeque<PendingEmit>,
}

/// The deferred delivery of one transition's events.
pub(crate) type PendingEmit = Box<dyn FnOnce() + Send>;

impl IconData {
    fn new(created: u64) -> Self {
        Self {
            name: String::new(),
            created,
            state: IconState::Deselected,
            enabled: true,
            manual_lock: false,
            debounce_holds: 0,
            debounce_tasks: Vec::new(),
            notices: 0,
            notice_subscriptions: Vec::new(),
            alignment: Alignment::default(),
            order: 1,
            auto_deselect: true,
            saved_auto_deselect: None,
            one_click: false,
            toggle_keys: Vec::new(),
            toggle_items: Vec::new(),
            dropdown_parent: None,
            menu_parent: None,
            dropdown: Vec::new(),
            menu: Vec::new(),
            theme: ThemeTable::new(),
            child_theme: ThemeTable::new(),
            janitor: Janitor::new(),
            signals: IconSignals::default(),
            bound_events: HashMap::new(),
            dispatching: false,
            queued_emits: VecDeque::new(),
        }
    }

    /// Locked while a manual lock or any debounce hold is outstanding.
    pub(crate) fn is_locked(&self) -> bool {
        self.manual_lock || self.debounce_holds > 0
    }

    pub(crate) fn parent(&self, kind: GroupKind) -> Option<IconId> {
        match kind {
            GroupKind::Dropdown => self.dropdown_parent,
            GroupKind::Menu => self.menu_parent,
        }
    }

    fn set_parent(&mut self, kind: GroupKind, parent: Option<IconId>) {
        match kind {
            GroupKind::Dropdown => self.dropdown_parent = parent,
            GroupKind::Menu => self.menu_parent = parent,
        }
    }

    pub(crate) fn children(&self, kind: GroupKind) -> &[IconId] {
        match kind {
            GroupKind::Dropdown => &self.dropdown,
            GroupKind::Menu => &self.menu,
        }
    }

    fn children_mut(&mut self, kind: GroupKind) -> &mut Vec<IconId> {
        match kind {
            GroupKind::Dropdown => &mut self.dropdown,
            GroupKind::Menu => &mut self.menu,
        }
    }

    /// Dropdown children then menu children, each listed once.
    pub(crate) fn all_children(&self) -> Vec<IconId> {
        let mut children = self.dropdown.clone();
        for child in &self.menu {
            if !children.contains(child) {
                children.push(*child);
            }
        }
        children
    }

    /// Whether this icon owns a non-empty dropdown or menu.
    pub(crate) fn has_group(&self) -> bool {
        !self.dropdown.is_empty() || !self.menu.is_empty()
    }

    /// Whether this icon is a member of some other icon's group.
    pub(crate) fn in_group(&self) -> bool {
        self.dropdown_parent.is_some() || self.menu_parent.is_some()
    }

    pub(crate) fn set_auto_deselect(&mut self, enabled: bool) {
        match &mut self.saved_auto_deselect {
            Some(saved) => *saved = enabled,
            None => self.auto_deselect = enabled,
        }
    }

    fn suspend_auto_deselect(&mut self) {
        if self.saved_auto_deselect.is_none() {
            self.saved_auto_deselect = Some(self.auto_deselect);
            self.auto_deselect = false;
        }
    }

    fn restore_auto_deselect(&mut self) {
        if !self.in_group()
            && let Some(saved) = self.saved_auto_deselect.take()
        {
            self.auto_deselect = saved;
        }
    }
}

/// Process-wide state owned by a context: the arena, the base theme and the
/// global display settings.
pub(crate) struct IconRegistry {
    pub(crate) icons: SlotMap<IconId, IconData>,
    pub(crate) base_theme: ThemeTable,
    pub(crate) config: ContextConfig,
    pub(crate) topbar_enabled: bool,
    pub(crate) display_order: i32,
    next_created: u64,
}

impl IconRegistry {
    pub(crate) fn new(config: ContextConfig) -> Self {
        Self {
            icons: SlotMap::with_key(),
            base_theme: schema::default_base_theme(),
            topbar_enabled: config.topbar_enabled,
            display_order: config.display_order,
            config,
            next_created: 0,
        }
    }

    /// Register a new icon.
    pub(crate) fn insert(&mut self) -> IconId {
        let created = self.next_created;
        self.next_created += 1;
        self.icons.insert(IconData::new(created))
    }

    pub(crate) fn get(&self, id: IconId) -> Result<&IconData> {
        self.icons.get(id).ok_or(IconError::Destroyed(id))
    }

    pub(crate) fn get_mut(&mut self, id: IconId) -> Result<&mut IconData> {
        self.icons.get_mut(id).ok_or(IconError::Destroyed(id))
    }

    /// Every live id, oldest first.
    pub(crate) fn ids(&self) -> Vec<IconId> {
        let mut ids: Vec<_> = self.icons.iter().map(|(id, data)| (data.created, id)).collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// The oldest icon with the given name.
    pub(crate) fn find_by_name(&self, name: &str) -> Option<IconId> {
        self.icons
            .iter()
            .filter(|(_, data)| data.name == name)
            .min_by_key(|(_, data)| data.created)
            .map(|(id, _)| id)
    }

    /// Icons not in any group, oldest first.
    pub(crate) fn roots(&self) -> Vec<IconId> {
        self.ids()
            .into_iter()
            .filter(|id| self.icons.get(*id).is_some_and(|data| !data.in_group()))
            .collect()
    }

    /// Every icon above `id` through either group kind.
    pub(crate) fn ancestors(&self, id: IconId) -> Vec<IconId> {
        let mut result = Vec::new();
        let mut stack: Vec<IconId> = self.parents(id).collect();
        while let Some(current) = stack.pop() {
            if !result.contains(&current) {
                result.push(current);
                stack.extend(self.parents(current));
            }
        }
        result
    }

    fn parents(&self, id: IconId) -> impl Iterator<Item = IconId> + '_ {
        GroupKind::ALL
            .into_iter()
            .filter_map(move |kind| self.icons.get(id).and_then(|data| data.parent(kind)))
    }

    /// Check that `child` may join a group owned by `parent`.
    pub(crate) fn check_join(&self, child: IconId, parent: IconId) -> Result<()> {
        self.get(child)?;
        self.get(parent)?;
        if child == parent {
            return Err(IconError::SelfReference);
        }
        if self.ancestors(parent).contains(&child) {
            return Err(IconError::CircularGroup { child, parent });
        }
        Ok(())
    }

    /// Remove `child` from its `kind` parent. Returns the former parent.
    pub(crate) fn detach(&mut self, child: IconId, kind: GroupKind) -> Option<IconId> {
        let parent = self.icons.get(child)?.parent(kind)?;
        if let Some(parent_data) = self.icons.get_mut(parent) {
            parent_data.children_mut(kind).retain(|&c| c != child);
        }
        self.clear_parent(child, kind);
        Some(parent)
    }

    /// Append `child` to `parent`'s `kind` group. The caller has already
    /// detached it from any previous parent of that kind.
    pub(crate) fn attach(&mut self, child: IconId, parent: IconId, kind: GroupKind) {
        if let Some(parent_data) = self.icons.get_mut(parent) {
            parent_data.children_mut(kind).push(child);
        }
        if let Some(child_data) = self.icons.get_mut(child) {
            child_data.set_parent(kind, Some(parent));
            child_data.suspend_auto_deselect();
        }
    }

    /// Forget `child`'s `kind` parent link without touching the parent.
    pub(crate) fn clear_parent(&mut self, child: IconId, kind: GroupKind) {
        if let Some(child_data) = self.icons.get_mut(child) {
            child_data.set_parent(kind, None);
            child_data.restore_auto_deselect();
        }
    }

    /// Remove `id` from its parents' child lists. Returns the parents.
    pub(crate) fn unlink_from_parents(&mut self, id: IconId, data: &IconData) -> Vec<IconId> {
        let mut parents = Vec::new();
        for kind in GroupKind::ALL {
            if let Some(parent) = data.parent(kind)
                && let Some(parent_data) = self.icons.get_mut(parent)
            {
                parent_data.children_mut(kind).retain(|&c| c != id);
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
        }
        parents
    }

    /// The badge count an icon displays: its own notices plus the displayed
    /// notices of children that are currently hidden.
    ///
    /// Children are hidden unless this icon is viewing its groups.
    pub(crate) fn displayed_notices(&self, id: IconId) -> u32 {
        let Some(data) = self.icons.get(id) else {
            return 0;
        };
        if data.state == IconState::Viewing {
            return data.notices;
        }
        let hidden: u32 = data
            .all_children()
            .into_iter()
            .filter(|child| {
                self.icons
                    .get(*child)
                    .is_some_and(|child_data| child_data.state != IconState::Viewing)
            })
            .map(|child| self.displayed_notices(child))
            .sum();
        data.notices + hidden
    }

    /// Appearance signals for the given icons and all of their ancestors.
    pub(crate) fn appearance_targets(&self, ids: &[IconId]) -> Vec<IconSignals> {
        let mut seen: Vec<IconId> = Vec::new();
        for &id in ids {
            for candidate in std::iter::once(id).chain(self.ancestors(id)) {
                if !seen.contains(&candidate) {
                    seen.push(candidate);
                }
            }
        }
        seen.into_iter()
            .filter_map(|id| self.icons.get(id).map(|data| data.signals.clone()))
            .collect()
    }
}
