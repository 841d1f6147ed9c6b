//! Dropdowns and menus.
//!
//! An icon can own two ordered child groups: a vertical dropdown and a
//! horizontal menu. A child belongs to at most one dropdown parent and at
//! most one menu parent at a time. While a selected icon owns a non-empty
//! group it is viewing; emptying the group drops it back to selected.
//!
//! Membership suspends the child's own auto-deselect, so selecting an entry
//! inside a dropdown never closes the dropdown.

use std::borrow::Borrow;
use std::sync::Arc;

use horizon_topbar_core::IconState;
use horizon_topbar_core::logging::targets;

use crate::context::ContextInner;
use crate::error::{IconError, Result};
use crate::icon::Icon;
use crate::registry::{GroupKind, IconId, IconRegistry};

/// Hand the parent's child theme to a newly joined child.
fn inherit_child_theme(registry: &mut IconRegistry, child: IconId, parent: IconId) {
    let Some(batch) = registry
        .icons
        .get(parent)
        .map(|data| data.child_theme.to_batch())
    else {
        return;
    };
    if let Some(child_data) = registry.icons.get_mut(child) {
        for modification in batch {
            child_data.theme.insert(modification);
        }
    }
}

impl ContextInner {
    /// Move `child` into `parent`'s group of the given kind.
    pub(crate) fn join(self: &Arc<Self>, child: IconId, parent: IconId, kind: GroupKind) -> Result<()> {
        let previous = {
            let mut registry = self.registry.lock();
            registry.check_join(child, parent)?;
            if registry.get(parent)?.children(kind).last() == Some(&child) {
                return Ok(());
            }
            let previous = registry.detach(child, kind);
            registry.attach(child, parent, kind);
            inherit_child_theme(&mut registry, child, parent);
            previous
        };
        tracing::debug!(target: targets::GROUP, %child, %parent, %kind, "icon joined group");

        let mut touched = vec![parent, child];
        if let Some(previous) = previous
            && previous != parent
        {
            self.refresh_viewing(previous);
            touched.push(previous);
        }
        self.refresh_viewing(parent);
        self.emit_appearance(&touched);
        Ok(())
    }

    /// Replace `parent`'s whole group of the given kind.
    ///
    /// Every id is checked before anything changes, so a bad entry leaves the
    /// group untouched.
    pub(crate) fn set_group(self: &Arc<Self>, parent: IconId, kind: GroupKind, children: &[IconId]) -> Result<()> {
        let mut wanted: Vec<IconId> = Vec::with_capacity(children.len());
        for child in children {
            if !wanted.contains(child) {
                wanted.push(*child);
            }
        }

        let (removed, touched_parents) = {
            let mut registry = self.registry.lock();
            registry.get(parent)?;
            for child in &wanted {
                registry.check_join(*child, parent)?;
            }

            let current = registry.get(parent)?.children(kind).to_vec();
            for child in &current {
                registry.detach(*child, kind);
            }

            let mut touched_parents = vec![parent];
            for child in &wanted {
                if let Some(previous) = registry.detach(*child, kind)
                    && !touched_parents.contains(&previous)
                {
                    touched_parents.push(previous);
                }
                registry.attach(*child, parent, kind);
                if !current.contains(child) {
                    inherit_child_theme(&mut registry, *child, parent);
                }
            }

            let removed: Vec<IconId> = current.into_iter().filter(|child| !wanted.contains(child)).collect();
            (removed, touched_parents)
        };
        tracing::debug!(
            target: targets::GROUP,
            %parent,
            %kind,
            children = wanted.len(),
            removed = removed.len(),
            "group replaced"
        );

        for touched in &touched_parents {
            self.refresh_viewing(*touched);
        }
        let mut appearance = touched_parents;
        appearance.extend(removed);
        appearance.extend(wanted);
        self.emit_appearance(&appearance);
        Ok(())
    }

    /// Remove `child` from its parent of the given kind, or from both kinds.
    pub(crate) fn leave(self: &Arc<Self>, child: IconId, kind: Option<GroupKind>) -> Result<()> {
        let parents = {
            let mut registry = self.registry.lock();
            registry.get(child)?;
            let mut parents = Vec::new();
            for group in GroupKind::ALL {
                if kind.is_some_and(|kind| kind != group) {
                    continue;
                }
                if let Some(parent) = registry.detach(child, group)
                    && !parents.contains(&parent)
                {
                    parents.push(parent);
                }
            }
            parents
        };
        if parents.is_empty() {
            return Ok(());
        }
        tracing::debug!(target: targets::GROUP, %child, parents = parents.len(), "icon left group");

        for parent in &parents {
            self.refresh_viewing(*parent);
        }
        let mut touched = parents;
        touched.push(child);
        self.emit_appearance(&touched);
        Ok(())
    }

    /// Bring a selected icon's viewing state in line with its groups.
    pub(crate) fn refresh_viewing(&self, id: IconId) {
        let transition = {
            let mut registry = self.registry.lock();
            let Some(data) = registry.icons.get_mut(id) else {
                return;
            };
            match (data.state, data.has_group()) {
                (IconState::Selected, true) => {
                    data.state = IconState::Viewing;
                    Some((true, data.signals.clone()))
                }
                (IconState::Viewing, false) => {
                    data.state = IconState::Selected;
                    Some((false, data.signals.clone()))
                }
                _ => None,
            }
        };
        let Some((viewing, signals)) = transition else {
            return;
        };
        tracing::debug!(target: targets::GROUP, %id, viewing, "viewing state refreshed");

        self.dispatch(
            id,
            Box::new(move || {
                if viewing {
                    signals.viewing_started.emit(());
                } else {
                    signals.viewing_ended.emit(());
                }
            }),
        );
        self.emit_appearance(&[id]);
    }

    fn group_handles(self: &Arc<Self>, id: IconId, kind: GroupKind) -> Result<Vec<Icon>> {
        self.read(id, |data| {
            data.children(kind)
                .iter()
                .map(|child| Icon::from_parts(*child, self.clone()))
                .collect()
        })
    }

    fn parent_handle(self: &Arc<Self>, id: IconId, kind: GroupKind) -> Result<Option<Icon>> {
        self.read(id, |data| {
            data.parent(kind)
                .map(|parent| Icon::from_parts(parent, self.clone()))
        })
    }
}

impl Icon {
    fn same_context(&self, other: &Icon) -> Result<()> {
        if Arc::ptr_eq(self.context_inner(), other.context_inner()) {
            Ok(())
        } else {
            Err(IconError::ForeignContext(other.id()))
        }
    }

    /// Replace this icon's dropdown with `icons`, in order.
    ///
    /// Previous children not in the list are detached, not destroyed.
    /// Duplicates are ignored after their first occurrence.
    pub fn set_dropdown<I>(&self, icons: I) -> Result<&Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Icon>,
    {
        self.set_group(GroupKind::Dropdown, icons)
    }

    /// Replace this icon's menu with `icons`, in order.
    pub fn set_menu<I>(&self, icons: I) -> Result<&Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Icon>,
    {
        self.set_group(GroupKind::Menu, icons)
    }

    /// Replace this icon's group of the given kind.
    ///
    /// Every icon must belong to this icon's context; otherwise the call
    /// fails with [`IconError::ForeignContext`] and the group is untouched.
    pub fn set_group<I>(&self, kind: GroupKind, icons: I) -> Result<&Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Icon>,
    {
        let mut children = Vec::new();
        for icon in icons {
            let icon = icon.borrow();
            self.same_context(icon)?;
            children.push(icon.id());
        }
        self.context_inner().set_group(self.id(), kind, &children)?;
        Ok(self)
    }

    /// Detach every dropdown child.
    pub fn clear_dropdown(&self) -> Result<&Self> {
        self.context_inner().set_group(self.id(), GroupKind::Dropdown, &[])?;
        Ok(self)
    }

    /// Detach every menu child.
    pub fn clear_menu(&self) -> Result<&Self> {
        self.context_inner().set_group(self.id(), GroupKind::Menu, &[])?;
        Ok(self)
    }

    /// Join `parent`'s dropdown, leaving any previous dropdown.
    pub fn join_dropdown(&self, parent: &Icon) -> Result<&Self> {
        self.join(parent, GroupKind::Dropdown)
    }

    /// Join `parent`'s menu, leaving any previous menu.
    pub fn join_menu(&self, parent: &Icon) -> Result<&Self> {
        self.join(parent, GroupKind::Menu)
    }

    /// Join `parent`'s group of the given kind, appended last.
    ///
    /// Joining the group this icon is already last in does nothing. Joining
    /// itself or one of its own descendants fails.
    pub fn join(&self, parent: &Icon, kind: GroupKind) -> Result<&Self> {
        self.same_context(parent)?;
        self.context_inner().join(self.id(), parent.id(), kind)?;
        Ok(self)
    }

    /// Leave every group this icon belongs to. Does nothing for an icon
    /// without parents.
    pub fn leave(&self) -> Result<&Self> {
        self.context_inner().leave(self.id(), None)?;
        Ok(self)
    }

    /// Leave only the dropdown or only the menu this icon belongs to.
    pub fn leave_group(&self, kind: GroupKind) -> Result<&Self> {
        self.context_inner().leave(self.id(), Some(kind))?;
        Ok(self)
    }

    pub fn dropdown_children(&self) -> Result<Vec<Icon>> {
        self.context_inner().group_handles(self.id(), GroupKind::Dropdown)
    }

    pub fn menu_children(&self) -> Result<Vec<Icon>> {
        self.context_inner().group_handles(self.id(), GroupKind::Menu)
    }

    pub fn dropdown_parent(&self) -> Result<Option<Icon>> {
        self.context_inner().parent_handle(self.id(), GroupKind::Dropdown)
    }

    pub fn menu_parent(&self) -> Result<Option<Icon>> {
        self.context_inner().parent_handle(self.id(), GroupKind::Menu)
    }

    /// The dropdown parent if there is one, otherwise the menu parent.
    pub fn parent(&self) -> Result<Option<Icon>> {
        Ok(self.dropdown_parent()?.or(self.menu_parent()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::IconContext;

    fn ids(icons: &[Icon]) -> Vec<IconId> {
        icons.iter().map(Icon::id).collect()
    }

    #[test]
    fn join_moves_between_parents() {
        let context = IconContext::new();
        let first = context.create_icon();
        let second = context.create_icon();
        let child = context.create_icon();

        child.join_dropdown(&first).unwrap();
        child.join_dropdown(&second).unwrap();
        assert!(first.dropdown_children().unwrap().is_empty());
        assert_eq!(ids(&second.dropdown_children().unwrap()), vec![child.id()]);
        assert_eq!(child.dropdown_parent().unwrap(), Some(second.clone()));

        child.join_menu(&first).unwrap();
        assert_eq!(child.menu_parent().unwrap(), Some(first.clone()));
        assert_eq!(child.parent().unwrap(), Some(second));
    }

    #[test]
    fn join_is_idempotent_for_last_child() {
        let context = IconContext::new();
        let parent = context.create_icon();
        let a = context.create_icon();
        let b = context.create_icon();

        a.join_dropdown(&parent).unwrap();
        b.join_dropdown(&parent).unwrap();
        b.join_dropdown(&parent).unwrap();
        assert_eq!(ids(&parent.dropdown_children().unwrap()), vec![a.id(), b.id()]);

        a.join_dropdown(&parent).unwrap();
        assert_eq!(ids(&parent.dropdown_children().unwrap()), vec![b.id(), a.id()]);
    }

    #[test]
    fn set_dropdown_replaces_and_clears() {
        let context = IconContext::new();
        let parent = context.create_icon();
        let children: Vec<Icon> = (0..3).map(|_| context.create_icon()).collect();

        parent.set_dropdown(&children).unwrap();
        assert_eq!(ids(&parent.dropdown_children().unwrap()), ids(&children));

        parent.clear_dropdown().unwrap();
        assert!(parent.dropdown_children().unwrap().is_empty());
        for child in &children {
            assert_eq!(child.dropdown_parent().unwrap(), None);
            assert!(!child.is_destroyed());
        }

        parent.set_dropdown([&children[2]]).unwrap();
        assert_eq!(ids(&parent.dropdown_children().unwrap()), vec![children[2].id()]);
    }

    #[test]
    fn set_menu_leaves_dropdown_alone() {
        let context = IconContext::new();
        let parent = context.create_icon();
        let a = context.create_icon();
        let b = context.create_icon();

        parent.set_dropdown([&a]).unwrap().set_menu([&b]).unwrap();
        parent.clear_menu().unwrap();
        assert_eq!(ids(&parent.dropdown_children().unwrap()), vec![a.id()]);
        assert!(parent.menu_children().unwrap().is_empty());
    }

    #[test]
    fn cycles_leave_group_untouched() {
        let context = IconContext::new();
        let top = context.create_icon();
        let middle = context.create_icon();
        let other = context.create_icon();
        middle.join_dropdown(&top).unwrap();

        assert_eq!(top.join_menu(&top).err(), Some(IconError::SelfReference));
        assert_eq!(
            top.join_dropdown(&middle).err(),
            Some(IconError::CircularGroup {
                child: top.id(),
                parent: middle.id()
            })
        );
        assert!(middle.set_dropdown([&other, &top]).is_err());
        assert!(middle.dropdown_children().unwrap().is_empty());
        assert_eq!(other.parent().unwrap(), None);
    }

    #[test]
    fn foreign_icons_are_rejected() {
        let context = IconContext::new();
        let elsewhere = IconContext::new();
        let icon = context.create_icon();
        let parent = elsewhere.create_icon();

        assert_eq!(
            icon.join_dropdown(&parent).err(),
            Some(IconError::ForeignContext(parent.id()))
        );
    }

    #[test]
    fn set_group_rejects_foreign_icons() {
        let context = IconContext::new();
        let elsewhere = IconContext::new();
        let parent = context.create_icon();
        let bystander = context.create_icon();
        let kept = context.create_icon();
        elsewhere.create_icon();
        // Same slot as `bystander`, different context.
        let foreign = elsewhere.create_icon();
        assert_eq!(foreign.id(), bystander.id());
        parent.set_menu([&kept]).unwrap();

        assert_eq!(
            parent.set_dropdown([&foreign]).err(),
            Some(IconError::ForeignContext(foreign.id()))
        );
        assert_eq!(
            parent.set_menu([&bystander, &foreign]).err(),
            Some(IconError::ForeignContext(foreign.id()))
        );
        assert!(parent.dropdown_children().unwrap().is_empty());
        assert_eq!(ids(&parent.menu_children().unwrap()), vec![kept.id()]);
        assert_eq!(bystander.parent().unwrap(), None);
    }

    #[test]
    fn group_membership_drives_viewing() {
        let context = IconContext::new();
        let parent = context.create_icon();
        let child = context.create_icon();

        parent.select().unwrap();
        assert_eq!(parent.state().unwrap(), IconState::Selected);
        child.join_dropdown(&parent).unwrap();
        assert_eq!(parent.state().unwrap(), IconState::Viewing);
        child.leave().unwrap();
        assert_eq!(parent.state().unwrap(), IconState::Selected);

        child.join_menu(&parent).unwrap();
        parent.deselect().unwrap();
        parent.select().unwrap();
        assert_eq!(parent.state().unwrap(), IconState::Viewing);
    }

    #[test]
    fn selecting_a_child_keeps_parent_open() {
        let context = IconContext::new();
        let parent = context.create_icon();
        let child = context.create_icon();
        child.join_dropdown(&parent).unwrap();

        parent.select().unwrap();
        child.select().unwrap();
        assert!(parent.is_viewing().unwrap());
        assert!(child.is_selected().unwrap());
        assert!(!child.auto_deselect().unwrap());

        child.leave().unwrap();
        assert!(child.auto_deselect().unwrap());
    }

    #[test]
    fn deselect_cascades_to_viewing_children() {
        let context = IconContext::new();
        let top = context.create_icon();
        let middle = context.create_icon();
        let leaf = context.create_icon();
        let plain = context.create_icon();
        middle.join_dropdown(&top).unwrap();
        plain.join_dropdown(&top).unwrap();
        leaf.join_menu(&middle).unwrap();

        top.select().unwrap();
        middle.select().unwrap();
        plain.select().unwrap();
        assert!(middle.is_viewing().unwrap());

        top.deselect().unwrap();
        assert_eq!(middle.state().unwrap(), IconState::Deselected);
        assert_eq!(plain.state().unwrap(), IconState::Selected);
    }

    #[test]
    fn child_theme_reaches_later_joiners() {
        use horizon_topbar_style::prelude::*;

        let context = IconContext::new();
        let parent = context.create_icon();
        parent
            .modify_child_theme(Modification::new(
                ThemeElement::IconLabel,
                ThemeProperty::TextSize,
                20.0,
            ))
            .unwrap();

        let late = context.create_icon();
        late.join_menu(&parent).unwrap();
        assert_eq!(
            late.resolved(ThemeElement::IconLabel, ThemeProperty::TextSize).unwrap(),
            ThemeValue::Number(20.0)
        );
    }
}
