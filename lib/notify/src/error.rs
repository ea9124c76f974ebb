//! Error types for the notify crate.
//!
//! - `PlatformError`: failures reported by the host notification surface
//! - `NotifyError`: sink-level failures, carried in a rootcause `Report`

use std::fmt;

/// Errors reported by a [`NotificationPlatform`](crate::NotificationPlatform).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The host rejected or failed to render the alert.
    PresentFailed { reason: String },
    /// The permission prompt could not be shown.
    PromptFailed { reason: String },
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PresentFailed { reason } => write!(f, "alert presentation failed: {reason}"),
            Self::PromptFailed { reason } => write!(f, "permission prompt failed: {reason}"),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Errors from sink operations.
///
/// Missing support or permission is not an error: `show` returns an inert
/// handle in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The platform failed while showing an alert.
    ShowFailed { tag: String, reason: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowFailed { tag, reason } => {
                write!(f, "failed to show notification '{tag}': {reason}")
            }
        }
    }
}

impl std::error::Error for NotifyError {}
