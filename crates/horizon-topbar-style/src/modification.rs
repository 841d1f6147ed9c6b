//! Theme modifications: the (element, property, value, state scope) tuples
//! callers hand to `modify_theme` and friends.
//!
//! # Example
//!
//! ```
//! use horizon_topbar_core::IconState;
//! use horizon_topbar_style::prelude::*;
//!
//! let batch: ModificationBatch = vec![
//!     Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "Shop"),
//!     Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "Close")
//!         .in_state(IconState::Selected),
//! ]
//! .into();
//! assert_eq!(batch.len(), 2);
//! ```

use horizon_topbar_core::IconState;

use crate::element::{ThemeElement, ThemeProperty};
use crate::error::Result;
use crate::types::ThemeValue;

/// One theme override.
///
/// Without a state scope the modification applies in every state. A scoped
/// modification applies only while the icon is in that state and wins over
/// an unscoped one for the same (element, property) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Modification {
    pub element: ThemeElement,
    pub property: ThemeProperty,
    pub value: ThemeValue,
    pub state: Option<IconState>,
}

/// The key a modification is stored under in a theme table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeKey {
    pub element: ThemeElement,
    pub property: ThemeProperty,
    pub scope: Option<IconState>,
}

impl ThemeKey {
    pub fn new(element: ThemeElement, property: ThemeProperty, scope: Option<IconState>) -> Self {
        Self {
            element,
            property,
            scope,
        }
    }
}

impl Modification {
    /// An unscoped modification.
    pub fn new(element: ThemeElement, property: ThemeProperty, value: impl Into<ThemeValue>) -> Self {
        Self {
            element,
            property,
            value: value.into(),
            state: None,
        }
    }

    /// Restrict this modification to a single icon state.
    pub fn in_state(mut self, state: IconState) -> Self {
        self.state = Some(state);
        self
    }

    /// Build a modification from string names, as a scripting layer would.
    ///
    /// Element and property names match exactly; the state name is matched
    /// case-insensitively. The value is type-checked later, when the
    /// modification is applied to a table.
    pub fn parse(
        element: &str,
        property: &str,
        value: impl Into<ThemeValue>,
        state: Option<&str>,
    ) -> Result<Self> {
        let element: ThemeElement = element.parse()?;
        let property: ThemeProperty = property.parse()?;
        let state = state.map(str::parse::<IconState>).transpose()?;
        Ok(Self {
            element,
            property,
            value: value.into(),
            state,
        })
    }

    /// The table key this modification writes.
    pub fn key(&self) -> ThemeKey {
        ThemeKey::new(self.element, self.property, self.state)
    }
}

/// An ordered list of modifications, applied front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModificationBatch(Vec<Modification>);

impl ModificationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modification.
    pub fn push(&mut self, modification: Modification) {
        self.0.push(modification);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Modification> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Modification] {
        &self.0
    }
}

impl From<Modification> for ModificationBatch {
    fn from(modification: Modification) -> Self {
        Self(vec![modification])
    }
}

impl From<Vec<Modification>> for ModificationBatch {
    fn from(modifications: Vec<Modification>) -> Self {
        Self(modifications)
    }
}

impl<const N: usize> From<[Modification; N]> for ModificationBatch {
    fn from(modifications: [Modification; N]) -> Self {
        Self(modifications.into())
    }
}

impl From<&[Modification]> for ModificationBatch {
    fn from(modifications: &[Modification]) -> Self {
        Self(modifications.to_vec())
    }
}

impl FromIterator<Modification> for ModificationBatch {
    fn from_iter<I: IntoIterator<Item = Modification>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ModificationBatch {
    type Item = Modification;
    type IntoIter = std::vec::IntoIter<Modification>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModificationBatch {
    type Item = &'a Modification;
    type IntoIter = std::slice::Iter<'a, Modification>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn parse_from_names() {
        let modification = Modification::parse("IconLabel", "TextSize", 18, Some("selected")).unwrap();
        assert_eq!(modification.element, ThemeElement::IconLabel);
        assert_eq!(modification.property, ThemeProperty::TextSize);
        assert_eq!(modification.value, ThemeValue::Number(18.0));
        assert_eq!(modification.state, Some(IconState::Selected));
    }

    #[test]
    fn parse_reports_the_bad_name() {
        assert_eq!(
            Modification::parse("Badge", "Visible", true, None),
            Err(Error::UnknownElement("Badge".into()))
        );
        assert_eq!(
            Modification::parse("Notice", "Colour", true, None),
            Err(Error::UnknownProperty("Colour".into()))
        );
        assert_eq!(
            Modification::parse("Notice", "Visible", true, Some("Hovering")),
            Err(Error::UnknownState("Hovering".into()))
        );
    }

    #[test]
    fn scope_is_part_of_the_key() {
        let unscoped = Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "a");
        let scoped = unscoped.clone().in_state(IconState::Viewing);
        assert_ne!(unscoped.key(), scoped.key());
        assert_eq!(scoped.key().scope, Some(IconState::Viewing));
    }

    #[test]
    fn batch_conversions() {
        let single = Modification::new(ThemeElement::Notice, ThemeProperty::Visible, false);
        assert_eq!(ModificationBatch::from(single.clone()).len(), 1);
        assert_eq!(ModificationBatch::from([single.clone(), single.clone()]).len(), 2);

        let collected: ModificationBatch = std::iter::repeat_n(single, 3).collect();
        assert_eq!(collected.iter().count(), 3);
    }
}
