//! Theme override engine for Horizon Topbar.
//!
//! This crate holds the declarative side of icon appearance:
//!
//! - **Schema**: the closed set of icon sub-elements, their properties, the
//!   value type each property accepts and its built-in default
//! - **Modifications**: `(element, property, value, state scope)` overrides,
//!   validated per entry so one bad entry never blocks the rest of a batch
//! - **Theme tables**: one level of overrides, used both for the process-wide
//!   base theme and for every icon's own overrides
//! - **Resolution**: icon overrides before base overrides, state-scoped
//!   entries before unscoped ones, built-in defaults last
//!
//! # Example
//!
//! ```
//! use horizon_topbar_core::IconState;
//! use horizon_topbar_style::prelude::*;
//!
//! let base = default_base_theme();
//! let mut icon = ThemeTable::new();
//! icon.apply(&ModificationBatch::from([
//!     Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "Shop"),
//!     Modification::new(ThemeElement::IconLabel, ThemeProperty::Text, "Close")
//!         .in_state(IconState::Selected),
//! ]))
//! .unwrap();
//!
//! let chain = ThemeChain::new(&icon, &base);
//! let label = chain
//!     .resolve(ThemeElement::IconLabel, ThemeProperty::Text, IconState::Selected)
//!     .unwrap();
//! assert_eq!(label.as_text(), Some("Close"));
//! ```

pub mod element;
pub mod modification;
pub mod resolve;
pub mod schema;
pub mod table;
pub mod types;

mod error;

pub use error::{Error, RejectedModification, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::element::{ThemeElement, ThemeProperty};
    pub use crate::error::{Error as ThemeError, RejectedModification};
    pub use crate::modification::{Modification, ModificationBatch, ThemeKey};
    pub use crate::resolve::{ResolvedTheme, ThemeChain, ValueSource};
    pub use crate::schema::default_base_theme;
    pub use crate::table::ThemeTable;
    pub use crate::types::{Color, FontRef, ImageRef, ThemeValue, ValueKind};
}
