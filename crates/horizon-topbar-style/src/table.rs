//! Theme tables: one level of the override chain.

use std::collections::HashMap;

use horizon_topbar_core::IconState;
use horizon_topbar_core::logging::targets;

use crate::element::{ThemeElement, ThemeProperty};
use crate::error::{Error, RejectedModification, Result};
use crate::modification::{Modification, ModificationBatch, ThemeKey};
use crate::schema;
use crate::types::ThemeValue;

/// A set of theme overrides keyed by (element, property, state scope).
///
/// Both the process-wide base theme and every icon's own overrides are
/// stored in a `ThemeTable`. Writing the same key again replaces the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeTable {
    entries: HashMap<ThemeKey, ThemeValue>,
}

impl ThemeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a modification without validating it.
    ///
    /// Returns the value previously stored under the same key.
    pub fn insert(&mut self, modification: Modification) -> Option<ThemeValue> {
        let key = modification.key();
        self.entries.insert(key, modification.value)
    }

    /// Validate and apply a batch in order.
    ///
    /// Each entry is checked against the schema on its own: a rejected entry
    /// is skipped and the rest of the batch still applies. If any entry was
    /// rejected the call returns [`Error::Rejected`] listing them along with
    /// the number that were applied; otherwise it returns the applied count.
    pub fn apply(&mut self, batch: &ModificationBatch) -> Result<usize> {
        let mut applied = 0;
        let mut rejected = Vec::new();

        for (index, modification) in batch.iter().enumerate() {
            match schema::validate(modification) {
                Ok(()) => {
                    tracing::trace!(
                        target: targets::THEME,
                        element = %modification.element,
                        property = %modification.property,
                        state = ?modification.state,
                        value = %modification.value,
                        "theme entry applied"
                    );
                    self.insert(modification.clone());
                    applied += 1;
                }
                Err(error) => {
                    tracing::warn!(target: targets::THEME, index, %error, "theme entry rejected");
                    rejected.push(RejectedModification { index, error });
                }
            }
        }

        if rejected.is_empty() {
            Ok(applied)
        } else {
            Err(Error::Rejected { rejected, applied })
        }
    }

    /// The value stored for an exact key.
    pub fn get(
        &self,
        element: ThemeElement,
        property: ThemeProperty,
        scope: Option<IconState>,
    ) -> Option<&ThemeValue> {
        self.entries.get(&ThemeKey::new(element, property, scope))
    }

    /// Remove the entry for an exact key.
    pub fn remove(
        &mut self,
        element: ThemeElement,
        property: ThemeProperty,
        scope: Option<IconState>,
    ) -> Option<ThemeValue> {
        self.entries.remove(&ThemeKey::new(element, property, scope))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&ThemeKey, &ThemeValue)> {
        self.entries.iter()
    }

    /// The entries as modifications, sorted by key.
    pub fn to_batch(&self) -> ModificationBatch {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|key| {
                self.entries.get(&key).map(|value| Modification {
                    element: key.element,
                    property: key.property,
                    value: value.clone(),
                    state: key.scope,
                })
            })
            .collect()
    }
}
