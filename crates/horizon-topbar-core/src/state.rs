//! Selection state shared by the state machine and the theme system.

use std::fmt;
use std::str::FromStr;

/// The selection state of an icon.
///
/// `Viewing` is a sub-state of `Selected`: the icon is selected *and* its
/// dropdown or menu is currently open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IconState {
    /// Not selected (initial state).
    #[default]
    Deselected,
    /// Selected, with no open group.
    Selected,
    /// Selected with a non-empty dropdown or menu on display.
    Viewing,
}

impl IconState {
    /// All states, in declaration order.
    pub const ALL: [IconState; 3] = [Self::Deselected, Self::Selected, Self::Viewing];

    /// Whether this state counts as selected (`Selected` or `Viewing`).
    pub fn is_selected(self) -> bool {
        !matches!(self, Self::Deselected)
    }

    /// The state whose scoped values apply when this state has none of its own.
    ///
    /// `Viewing` falls back to `Selected`; the others have no fallback.
    pub fn fallback(self) -> Option<IconState> {
        match self {
            Self::Viewing => Some(Self::Selected),
            _ => None,
        }
    }

    /// The canonical name of this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deselected => "Deselected",
            Self::Selected => "Selected",
            Self::Viewing => "Viewing",
        }
    }
}

impl fmt::Display for IconState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStateError(pub String);

impl fmt::Display for UnknownStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown icon state '{}'", self.0)
    }
}

impl std::error::Error for UnknownStateError {}

impl FromStr for IconState {
    type Err = UnknownStateError;

    /// Parse a state name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStateError(s.to_string()))
    }
}
