//! Loading habit data files.

use crate::error::StartupError;
use habitual_core::Result;
use habitual_habits::{Habit, InMemoryHabitLedger, VacationPeriod};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StartupError> {
    let contents = std::fs::read_to_string(path).map_err(|e| StartupError::ReadFile {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    let value = serde_json::from_str(&contents).map_err(|e| StartupError::ParseFile {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    Ok(value)
}

/// Reads a JSON array of habits.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_habits(path: &Path) -> Result<Vec<Habit>, StartupError> {
    read_json(path)
}

/// Reads a JSON array of vacation periods.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_vacations(path: &Path) -> Result<Vec<VacationPeriod>, StartupError> {
    read_json(path)
}

/// Builds a ledger from the habits file and optional vacations file.
///
/// # Errors
///
/// Returns an error if a file cannot be loaded or a vacation is invalid.
pub fn load_ledger(
    habits_file: &Path,
    vacations_file: Option<&Path>,
) -> Result<InMemoryHabitLedger, StartupError> {
    let habits = load_habits(habits_file)?;
    let ledger = InMemoryHabitLedger::with_data(habits, Vec::new());

    let vacations = match vacations_file {
        Some(path) => load_vacations(path)?,
        None => Vec::new(),
    };
    for vacation in vacations {
        ledger
            .add_vacation(vacation)
            .map_err(|e| StartupError::Ledger {
                details: e.to_string(),
            })?;
    }

    info!(
        habits_file = %habits_file.display(),
        "Loaded habit data"
    );
    Ok(ledger)
}
