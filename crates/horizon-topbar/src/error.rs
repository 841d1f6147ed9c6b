//! Error types for icon operations.

use crate::registry::IconId;

/// Result type alias for icon operations.
pub type Result<T> = std::result::Result<T, IconError>;

/// Errors that can occur when operating on icons.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IconError {
    /// A theme modification was rejected by the schema.
    ///
    /// For a batch, the entries that passed validation were still applied.
    #[error("Invalid theme configuration: {0}")]
    Configuration(#[from] horizon_topbar_style::Error),

    /// An event name did not match any icon event.
    #[error("Unknown icon event '{0}'")]
    Lookup(String),

    /// A key name did not match any key.
    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    /// The icon has been destroyed; every further operation on it fails.
    #[error("Icon {0} has been destroyed")]
    Destroyed(IconId),

    /// An icon was asked to join its own dropdown or menu.
    #[error("An icon cannot join its own group")]
    SelfReference,

    /// Joining would make an icon its own ancestor.
    #[error("Icon {child} is an ancestor of icon {parent} and cannot join its group")]
    CircularGroup { child: IconId, parent: IconId },

    /// The icon belongs to a different context.
    #[error("Icon {0} belongs to a different context")]
    ForeignContext(IconId),
}

impl IconError {
    /// Whether this error reports a destroyed icon.
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed(_))
    }
}
