//! Error types for the theme system.

use horizon_topbar_core::UnknownStateError;

use crate::element::{ThemeElement, ThemeProperty};
use crate::types::ValueKind;

/// Result type alias for theme operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the theme system.
///
/// Every variant describes a configuration problem in a theme modification;
/// none of them leave a theme table partially updated for the offending entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The element name is not part of the icon schema.
    #[error("Unknown theme element '{0}'")]
    UnknownElement(String),

    /// The property name is not part of the icon schema.
    #[error("Unknown theme property '{0}'")]
    UnknownProperty(String),

    /// The state scope name is not a known icon state.
    #[error("Unknown state scope '{0}'")]
    UnknownState(String),

    /// The property exists, but not on this element.
    #[error("Property '{property}' is not supported by element '{element}'")]
    UnsupportedProperty {
        element: ThemeElement,
        property: ThemeProperty,
    },

    /// The value has the wrong type for the property.
    #[error("Invalid value for '{element}.{property}': expected {expected}, got {got}")]
    TypeMismatch {
        element: ThemeElement,
        property: ThemeProperty,
        expected: ValueKind,
        got: ValueKind,
    },

    /// The image reference is malformed.
    #[error("Invalid image reference '{0}'")]
    InvalidImage(String),

    /// The font reference is malformed.
    #[error("Invalid font reference '{0}'")]
    InvalidFont(String),

    /// Some entries of a modification batch were rejected; the rest were applied.
    #[error("{} theme modification(s) rejected, {applied} applied", .rejected.len())]
    Rejected {
        rejected: Vec<RejectedModification>,
        applied: usize,
    },
}

/// One rejected entry of a modification batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedModification {
    /// Position of the entry within its batch.
    pub index: usize,
    /// Why it was rejected.
    pub error: Error,
}

impl From<UnknownStateError> for Error {
    fn from(err: UnknownStateError) -> Self {
        Self::UnknownState(err.0)
    }
}

impl Error {
    /// The individual failures behind this error.
    ///
    /// For [`Error::Rejected`] this is the list of rejected entries; for any
    /// other variant it is the error itself at index 0.
    pub fn failures(&self) -> Vec<RejectedModification> {
        match self {
            Self::Rejected { rejected, .. } => rejected.clone(),
            other => vec![RejectedModification {
                index: 0,
                error: other.clone(),
            }],
        }
    }
}
