//! Horizon Topbar - persistent overlay icon widgets.
//!
//! This is the main crate. It re-exports the core primitives and the theme
//! system, and adds the icon engine on top:
//!
//! - **Context**: [`IconContext`] owns every icon, the base theme and the
//!   global display settings
//! - **Icons**: [`Icon`] handles with a chainable surface
//! - **State machine**: deselected, selected and viewing, plus lock,
//!   enabled and debounce
//! - **Grouping**: dropdowns and menus with cascading deselect and destroy
//! - **Notices**: badge counts cleared by signals, aggregated onto parents
//! - **Bindings**: toggle keys, toggle items and named event callbacks
//!
//! # Example
//!
//! ```
//! use horizon_topbar::prelude::*;
//! use std::sync::Arc;
//!
//! let context = IconContext::new();
//! let shop = context.create_named("shop");
//! shop.set_label("Shop", None)?
//!     .set_label("Close", Some(IconState::Selected))?
//!     .bind_toggle_key(Key::B)?
//!     .bind_event(IconEvent::Selected, |icon, _| {
//!         println!("{} opened", icon.name().unwrap_or_default());
//!     })?;
//!
//! let coins = context.create_named("coins");
//! coins.join_dropdown(&shop)?;
//!
//! context.handle_key_press(Key::B);
//! assert_eq!(shop.state()?, IconState::Viewing);
//!
//! let label = shop.resolved(ThemeElement::IconLabel, ThemeProperty::Text)?;
//! assert_eq!(label.as_text(), Some("Close"));
//!
//! shop.destroy()?;
//! assert!(coins.is_destroyed());
//! # Ok::<(), IconError>(())
//! ```

pub use horizon_topbar_core::*;

/// The theme system.
pub mod style {
    pub use horizon_topbar_style::*;
}

mod bindings;
mod config;
mod context;
mod debug;
mod error;
mod events;
mod grouping;
mod icon;
mod notices;
pub mod prelude;
mod registry;
mod state_machine;
mod theming;

pub use bindings::{Key, ToggleItem};
pub use config::{ChildPolicy, ContextConfig, DEFAULT_DISPLAY_ORDER, DestroyPolicy};
pub use context::{ContextSignals, IconContext};
pub use debug::{IconTreeDebug, TreeFormatOptions, TreeStyle};
pub use error::{IconError, Result};
pub use events::{IconEvent, IconEventArgs, IconSignals};
pub use icon::{Icon, IconSnapshot};
pub use registry::{Alignment, GroupKind, IconId};
