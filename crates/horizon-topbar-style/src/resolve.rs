//! Theme resolution.
//!
//! A value is looked up through two levels, the icon's own table and then the
//! base table. At each level the entry scoped to the current state wins over
//! the unscoped entry. A `Viewing` icon also matches entries scoped to
//! `Selected`, since viewing is a kind of selected. When neither level has an
//! entry the schema's built-in default is used.

use std::collections::BTreeMap;

use horizon_topbar_core::IconState;

use crate::element::{ThemeElement, ThemeProperty};
use crate::error::{Error, Result};
use crate::schema;
use crate::table::ThemeTable;
use crate::types::ThemeValue;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// The icon's own table, scoped to the given state.
    InstanceScoped(IconState),
    /// The icon's own table, unscoped.
    Instance,
    /// The base table, scoped to the given state.
    BaseScoped(IconState),
    /// The base table, unscoped.
    Base,
    /// The schema's built-in default.
    Builtin,
}

/// The two-level override chain for a single icon.
#[derive(Debug, Clone, Copy)]
pub struct ThemeChain<'a> {
    pub instance: &'a ThemeTable,
    pub base: &'a ThemeTable,
}

impl<'a> ThemeChain<'a> {
    pub fn new(instance: &'a ThemeTable, base: &'a ThemeTable) -> Self {
        Self { instance, base }
    }

    /// Resolve one property for an icon in `state`.
    pub fn resolve(
        &self,
        element: ThemeElement,
        property: ThemeProperty,
        state: IconState,
    ) -> Result<ThemeValue> {
        self.resolve_with_source(element, property, state)
            .map(|(value, _)| value)
    }

    /// Resolve one property and report which level supplied it.
    pub fn resolve_with_source(
        &self,
        element: ThemeElement,
        property: ThemeProperty,
        state: IconState,
    ) -> Result<(ThemeValue, ValueSource)> {
        if let Some((value, scope)) = lookup(self.instance, element, property, state) {
            let source = scope.map_or(ValueSource::Instance, ValueSource::InstanceScoped);
            return Ok((value.clone(), source));
        }
        if let Some((value, scope)) = lookup(self.base, element, property, state) {
            let source = scope.map_or(ValueSource::Base, ValueSource::BaseScoped);
            return Ok((value.clone(), source));
        }

        schema::builtin_default(element, property)
            .map(|value| (value, ValueSource::Builtin))
            .ok_or(Error::UnsupportedProperty { element, property })
    }

    /// Resolve every schema property for an icon in `state`.
    pub fn resolve_all(&self, state: IconState) -> ResolvedTheme {
        let values = schema::entries()
            .filter_map(|(element, property)| {
                self.resolve(element, property, state)
                    .ok()
                    .map(|value| ((element, property), value))
            })
            .collect();
        ResolvedTheme { state, values }
    }
}

/// One level of the chain: scoped entries from the most specific state
/// outwards, then the unscoped entry.
fn lookup(
    table: &ThemeTable,
    element: ThemeElement,
    property: ThemeProperty,
    state: IconState,
) -> Option<(&ThemeValue, Option<IconState>)> {
    std::iter::successors(Some(state), |s| s.fallback())
        .find_map(|scope| table.get(element, property, Some(scope)).map(|v| (v, Some(scope))))
        .or_else(|| table.get(element, property, None).map(|v| (v, None)))
}

/// Every resolved property of an icon, as a renderer consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
    state: IconState,
    values: BTreeMap<(ThemeElement, ThemeProperty), ThemeValue>,
}

impl ResolvedTheme {
    /// The state these values were resolved for.
    pub fn state(&self) -> IconState {
        self.state
    }

    pub fn get(&self, element: ThemeElement, property: ThemeProperty) -> Option<&ThemeValue> {
        self.values.get(&(element, property))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in (element, property) order.
    pub fn iter(&self) -> impl Iterator<Item = (ThemeElement, ThemeProperty, &ThemeValue)> {
        self.values
            .iter()
            .map(|((element, property), value)| (*element, *property, value))
    }

    /// The properties whose values differ from `other`.
    pub fn diff(&self, other: &ResolvedTheme) -> Vec<(ThemeElement, ThemeProperty)> {
        self.values
            .iter()
            .filter(|(key, value)| other.values.get(*key) != Some(*value))
            .map(|(key, _)| *key)
            .collect()
    }
}
