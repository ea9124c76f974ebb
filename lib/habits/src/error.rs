//! Error types for the habits crate.

use habitual_core::VacationId;
use std::fmt;

/// Errors from reading habit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitError {
    /// The backing store could not be read.
    StoreUnavailable { reason: String },
    /// A vacation period is malformed.
    InvalidVacation { id: VacationId, reason: String },
}

impl fmt::Display for HabitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreUnavailable { reason } => write!(f, "habit store unavailable: {reason}"),
            Self::InvalidVacation { id, reason } => {
                write!(f, "invalid vacation {id}: {reason}")
            }
        }
    }
}

impl std::error::Error for HabitError {}
