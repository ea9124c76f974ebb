//! Startup errors for the reminder daemon.

use std::fmt;
use std::path::PathBuf;

/// Errors that stop the daemon from starting.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration is missing or invalid.
    Config { details: String },
    /// A data file could not be read.
    ReadFile { path: PathBuf, details: String },
    /// A data file is not valid JSON for its contents.
    ParseFile { path: PathBuf, details: String },
    /// The loaded data was rejected by the ledger.
    Ledger { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {details}"),
            Self::ReadFile { path, details } => {
                write!(f, "failed to read '{}': {details}", path.display())
            }
            Self::ParseFile { path, details } => {
                write!(f, "failed to parse '{}': {details}", path.display())
            }
            Self::Ledger { details } => write!(f, "failed to load habit data: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}
