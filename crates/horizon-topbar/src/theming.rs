//! Theme overrides on icons.
//!
//! Each icon carries its own [`ThemeTable`] layered over the context's base
//! theme. Modifications are validated entry by entry: a bad entry is
//! reported through [`IconError::Configuration`] while the rest of the batch
//! still applies.
//!
//! Icons also carry a child theme: modifications handed to every current
//! dropdown and menu child, and to every icon that joins later.

use horizon_topbar_core::IconState;
use horizon_topbar_core::logging::targets;
use horizon_topbar_style::element::{ThemeElement, ThemeProperty};
use horizon_topbar_style::modification::{Modification, ModificationBatch};
use horizon_topbar_style::resolve::{ResolvedTheme, ThemeChain, ValueSource};
use horizon_topbar_style::schema;
use horizon_topbar_style::types::{ImageRef, ThemeValue};

use crate::context::{ContextInner, IconContext};
use crate::error::{IconError, Result};
use crate::icon::Icon;
use crate::registry::{IconData, IconId, IconRegistry};

/// Resolve every themed property of `data` in its current state.
pub(crate) fn resolve_all(registry: &IconRegistry, data: &IconData) -> ResolvedTheme {
    ThemeChain::new(&data.theme, &registry.base_theme).resolve_all(data.state)
}

/// Entries that passed validation, so a batch that was partly rejected can
/// still be handed on.
fn applied_count(result: &horizon_topbar_style::Result<usize>) -> usize {
    match result {
        Ok(applied) => *applied,
        Err(horizon_topbar_style::Error::Rejected { applied, .. }) => *applied,
        Err(_) => 0,
    }
}

impl ContextInner {
    pub(crate) fn modify_theme(&self, id: IconId, batch: &ModificationBatch) -> Result<usize> {
        let result = self.update(id, |data| data.theme.apply(batch))?;
        if applied_count(&result) > 0 {
            self.emit_appearance(&[id]);
        }
        tracing::debug!(target: targets::THEME, %id, entries = batch.len(), ok = result.is_ok(), "icon theme modified");
        Ok(result?)
    }

    pub(crate) fn modify_child_theme(&self, id: IconId, batch: &ModificationBatch) -> Result<usize> {
        let (result, children) = {
            let mut registry = self.registry.lock();
            let data = registry.get_mut(id)?;
            let result = data.child_theme.apply(batch);
            let children = data.all_children();
            let accepted: ModificationBatch = batch
                .iter()
                .filter(|modification| schema::validate(modification).is_ok())
                .cloned()
                .collect();
            for child in &children {
                if let Some(child_data) = registry.icons.get_mut(*child) {
                    for modification in &accepted {
                        child_data.theme.insert(modification.clone());
                    }
                }
            }
            (result, children)
        };
        tracing::debug!(
            target: targets::THEME,
            %id,
            entries = batch.len(),
            children = children.len(),
            "child theme modified"
        );
        if applied_count(&result) > 0 {
            self.emit_appearance(&children);
        }
        Ok(result?)
    }

    pub(crate) fn modify_base_theme(&self, batch: &ModificationBatch) -> Result<usize> {
        let (result, targets) = {
            let mut registry = self.registry.lock();
            let result = registry.base_theme.apply(batch);
            let ids = registry.ids();
            let targets: Vec<_> = ids
                .into_iter()
                .filter_map(|id| registry.icons.get(id).map(|data| data.signals.clone()))
                .collect();
            (result, targets)
        };
        tracing::debug!(target: targets::THEME, entries = batch.len(), icons = targets.len(), "base theme modified");
        if applied_count(&result) > 0 {
            for signals in targets {
                signals.appearance_changed.emit(());
            }
        }
        Ok(result?)
    }
}

impl Icon {
    /// Apply theme overrides to this icon.
    ///
    /// Accepts a single [`Modification`] or anything convertible into a
    /// [`ModificationBatch`]. Entries apply in order; a later entry for the
    /// same element, property and state scope replaces an earlier one.
    ///
    /// ```
    /// use horizon_topbar::IconContext;
    /// use horizon_topbar::style::prelude::*;
    /// use horizon_topbar_core::IconState;
    ///
    /// let context = IconContext::new();
    /// let icon = context.create_icon();
    /// icon.modify_theme([
    ///     Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "Shop"),
    ///     Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "Close")
    ///         .in_state(IconState::Selected),
    /// ])?;
    ///
    /// icon.select()?;
    /// let label = icon.resolved(ThemeElement::IconLabel, ThemeProperty::Text)?;
    /// assert_eq!(label.as_text(), Some("Close"));
    /// # Ok::<(), horizon_topbar::IconError>(())
    /// ```
    pub fn modify_theme(&self, modifications: impl Into<ModificationBatch>) -> Result<&Self> {
        self.context_inner().modify_theme(self.id(), &modifications.into())?;
        Ok(self)
    }

    /// Apply theme overrides to every current dropdown and menu child, and
    /// remember them for icons that join later.
    pub fn modify_child_theme(&self, modifications: impl Into<ModificationBatch>) -> Result<&Self> {
        self.context_inner().modify_child_theme(self.id(), &modifications.into())?;
        Ok(self)
    }

    /// Set the label text, optionally only for one state.
    pub fn set_label(&self, text: &str, state: Option<IconState>) -> Result<&Self> {
        self.modify_theme(scoped(ThemeElement::IconLabel, ThemeProperty::Text, text, state))
    }

    /// Set the image, optionally only for one state.
    pub fn set_image(&self, image: &str, state: Option<IconState>) -> Result<&Self> {
        self.modify_theme(scoped(
            ThemeElement::IconImage,
            ThemeProperty::Image,
            ImageRef::new(image),
            state,
        ))
    }

    /// The value a renderer should use for one property right now.
    pub fn resolved(&self, element: ThemeElement, property: ThemeProperty) -> Result<ThemeValue> {
        self.resolved_with_source(element, property).map(|(value, _)| value)
    }

    /// Like [`resolved`](Self::resolved), also reporting which level of the
    /// theme chain supplied the value.
    pub fn resolved_with_source(
        &self,
        element: ThemeElement,
        property: ThemeProperty,
    ) -> Result<(ThemeValue, ValueSource)> {
        let registry = self.context_inner().registry.lock();
        let data = registry.get(self.id())?;
        ThemeChain::new(&data.theme, &registry.base_theme)
            .resolve_with_source(element, property, data.state)
            .map_err(IconError::from)
    }

    /// Every themed property resolved for the current state.
    pub fn resolved_theme(&self) -> Result<ResolvedTheme> {
        let registry = self.context_inner().registry.lock();
        let data = registry.get(self.id())?;
        Ok(resolve_all(&registry, data))
    }

    /// This icon's own overrides, in key order.
    pub fn theme(&self) -> Result<ModificationBatch> {
        self.context_inner().read(self.id(), |data| data.theme.to_batch())
    }

    /// The overrides handed to this icon's children, in key order.
    pub fn child_theme(&self) -> Result<ModificationBatch> {
        self.context_inner().read(self.id(), |data| data.child_theme.to_batch())
    }
}

fn scoped(
    element: ThemeElement,
    property: ThemeProperty,
    value: impl Into<ThemeValue>,
    state: Option<IconState>,
) -> Modification {
    let modification = Modification::new(element, property, value);
    match state {
        Some(state) => modification.in_state(state),
        None => modification,
    }
}

impl IconContext {
    /// Apply overrides to the base theme shared by every icon in this
    /// context. Every live icon is told to redraw.
    pub fn modify_base_theme(&self, modifications: impl Into<ModificationBatch>) -> Result<usize> {
        self.inner().modify_base_theme(&modifications.into())
    }

    /// The base theme, in key order.
    pub fn base_theme(&self) -> ModificationBatch {
        self.inner().registry.lock().base_theme.to_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_topbar_style::types::Color;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const E: ThemeElement = ThemeElement::IconLabel;
    const P: ThemeProperty = ThemeProperty::TextColor;

    #[test]
    fn four_level_precedence() {
        let context = IconContext::new();
        let icon = context.create_icon();
        let v0 = Color::from_rgb8(0, 0, 0);
        let v1 = Color::from_rgb8(1, 1, 1);
        let v2 = Color::from_rgb8(2, 2, 2);
        let v3 = Color::from_rgb8(3, 3, 3);

        context
            .modify_base_theme([
                Modification::new(E, P, v0),
                Modification::new(E, P, v1).in_state(IconState::Selected),
            ])
            .unwrap();
        icon.modify_theme([
            Modification::new(E, P, v2),
            Modification::new(E, P, v3).in_state(IconState::Selected),
        ])
        .unwrap();

        assert_eq!(icon.resolved(E, P).unwrap(), ThemeValue::Color(v2));
        icon.select().unwrap();
        assert_eq!(icon.resolved(E, P).unwrap(), ThemeValue::Color(v3));
        assert_eq!(
            icon.resolved_with_source(E, P).unwrap().1,
            ValueSource::InstanceScoped(IconState::Selected)
        );
    }

    #[test]
    fn bad_entry_does_not_block_batch() {
        let context = IconContext::new();
        let icon = context.create_icon();
        let result = icon.modify_theme([
            Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "Shop"),
            Modification::new(ThemeElement::IconCorners, ThemeProperty::Text, "nope"),
        ]);

        assert!(matches!(result, Err(IconError::Configuration(_))));
        assert_eq!(
            icon.resolved(ThemeElement::IconLabel, ThemeProperty::Text).unwrap(),
            ThemeValue::from("Shop")
        );
        assert_eq!(icon.theme().unwrap().len(), 1);
    }

    #[test]
    fn labels_follow_state() {
        let context = IconContext::new();
        let icon = context.create_icon();
        icon.set_label("Open", None)
            .unwrap()
            .set_label("Close", Some(IconState::Selected))
            .unwrap()
            .set_image("rbxassetid://123", None)
            .unwrap();

        let label = |icon: &Icon| icon.resolved(ThemeElement::IconLabel, ThemeProperty::Text).unwrap();
        assert_eq!(label(&icon), ThemeValue::from("Open"));
        icon.select().unwrap();
        assert_eq!(label(&icon), ThemeValue::from("Close"));
    }

    #[test]
    fn base_theme_change_redraws_every_icon() {
        let context = IconContext::new();
        let redraws = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let icon = context.create_icon();
            let redraws = redraws.clone();
            icon.signals().unwrap().appearance_changed.connect(move |_| {
                redraws.fetch_add(1, Ordering::SeqCst);
            });
        }

        context
            .modify_base_theme(Modification::new(E, P, Color::WHITE))
            .unwrap();
        assert_eq!(redraws.load(Ordering::SeqCst), 3);

        context.reset();
        assert_eq!(context.base_theme(), schema::default_base_theme().to_batch());
    }

    #[test]
    fn child_theme_applies_to_current_children() {
        let context = IconContext::new();
        let parent = context.create_icon();
        let child = context.create_icon();
        child.join_dropdown(&parent).unwrap();

        parent
            .modify_child_theme(Modification::new(E, P, Color::WHITE))
            .unwrap();
        assert_eq!(child.resolved(E, P).unwrap(), ThemeValue::Color(Color::WHITE));
        assert_eq!(parent.child_theme().unwrap().len(), 1);
        assert_eq!(parent.theme().unwrap().len(), 0);
    }
}
