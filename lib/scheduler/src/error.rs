//! Error types for the scheduler crate.
//!
//! - `TimeOfDayError`: malformed `HH:mm` values
//! - `PredicateError`: a suppression predicate could not decide
//! - `TimerError`: a timer could not be armed
//! - `RegisterError`: why a reminder was not registered

use crate::time::TimeOfDay;
use std::fmt;

/// Errors from parsing or constructing a time of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeOfDayError {
    /// The value is not in `HH:mm` form.
    Malformed { value: String },
    /// Hour or minute is out of range.
    OutOfRange { hour: u32, minute: u32 },
}

impl fmt::Display for TimeOfDayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { value } => write!(f, "invalid time of day '{value}', expected HH:mm"),
            Self::OutOfRange { hour, minute } => {
                write!(f, "time of day out of range: {hour}:{minute:02}")
            }
        }
    }
}

impl std::error::Error for TimeOfDayError {}

/// Errors raised by a suppression predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    /// The predicate could not evaluate.
    Failed { reason: String },
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "predicate evaluation failed: {reason}"),
        }
    }
}

impl std::error::Error for PredicateError {}

/// Errors from arming a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// No Tokio runtime is available to run the timer.
    NoRuntime,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuntime => write!(f, "no async runtime available to arm timer"),
        }
    }
}

impl std::error::Error for TimerError {}

/// Reasons a reminder registration is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// The reminder has an empty id.
    EmptyId,
    /// A reminder with this id is already registered.
    Duplicate { id: String, time: TimeOfDay },
    /// The slot's timer could not be armed.
    Timer { id: String, source: TimerError },
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "reminder id must not be empty"),
            Self::Duplicate { id, time } => {
                write!(f, "reminder '{id}' is already scheduled at {time}")
            }
            Self::Timer { id, source } => write!(f, "cannot schedule reminder '{id}': {source}"),
        }
    }
}

impl std::error::Error for RegisterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timer { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_error_display() {
        let err = TimeOfDayError::Malformed {
            value: "9am".to_string(),
        };
        assert!(err.to_string().contains("9am"));

        let err = TimeOfDayError::OutOfRange {
            hour: 25,
            minute: 5,
        };
        assert!(err.to_string().contains("25:05"));
    }

    #[test]
    fn register_error_display() {
        let err = RegisterError::Duplicate {
            id: "habit-1-09:00".to_string(),
            time: "09:00".parse().expect("valid time"),
        };
        let display = err.to_string();
        assert!(display.contains("habit-1-09:00"));
        assert!(display.contains("09:00"));
    }

    #[test]
    fn timer_failure_keeps_source() {
        use std::error::Error;

        let err = RegisterError::Timer {
            id: "x".to_string(),
            source: TimerError::NoRuntime,
        };
        assert!(err.source().is_some());
    }
}
