//! Error types for Horizon Topbar core systems.

use std::fmt;

/// Scheduler-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduled task ID is invalid, or the task already ran or was cancelled.
    InvalidTaskId,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTaskId => write!(f, "Invalid, completed or cancelled scheduled task ID"),
        }
    }
}

impl std::error::Error for SchedulerError {}
