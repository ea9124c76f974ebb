//! Read access to habits, completions and vacations.
//!
//! Persistence lives elsewhere; reminder code only needs to ask questions
//! about the current state, which is what [`HabitLedger`] exposes.

use crate::error::HabitError;
use crate::habit::Habit;
use crate::vacation::VacationPeriod;
use chrono::NaiveDate;
use habitual_core::{HabitId, Result, VacationId};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Source of habit state consulted by reminders.
pub trait HabitLedger: Send + Sync {
    /// Returns every habit, archived ones included.
    fn habits(&self) -> Result<Vec<Habit>, HabitError>;

    /// Returns the habit with the given id.
    fn habit(&self, id: HabitId) -> Result<Option<Habit>, HabitError>;

    /// Returns whether the habit was completed on `date`.
    fn is_completed(&self, id: HabitId, date: NaiveDate) -> Result<bool, HabitError>;

    /// Returns every vacation period.
    fn vacations(&self) -> Result<Vec<VacationPeriod>, HabitError>;
}

#[derive(Debug, Default)]
struct LedgerData {
    habits: HashMap<HabitId, Habit>,
    completions: HashSet<(HabitId, NaiveDate)>,
    vacations: Vec<VacationPeriod>,
}

/// A [`HabitLedger`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryHabitLedger {
    data: RwLock<LedgerData>,
}

impl InMemoryHabitLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger holding the given habits and vacations.
    #[must_use]
    pub fn with_data(habits: Vec<Habit>, vacations: Vec<VacationPeriod>) -> Self {
        Self {
            data: RwLock::new(LedgerData {
                habits: habits.into_iter().map(|h| (h.id, h)).collect(),
                completions: HashSet::new(),
                vacations,
            }),
        }
    }

    /// Inserts or replaces a habit.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger is unusable.
    pub fn upsert_habit(&self, habit: Habit) -> Result<(), HabitError> {
        self.write()?.habits.insert(habit.id, habit);
        Ok(())
    }

    /// Removes a habit and its completions.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger is unusable.
    pub fn remove_habit(&self, id: HabitId) -> Result<Option<Habit>, HabitError> {
        let mut data = self.write()?;
        data.completions.retain(|(habit, _)| *habit != id);
        Ok(data.habits.remove(&id))
    }

    /// Records or clears a completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger is unusable.
    pub fn set_completed(
        &self,
        id: HabitId,
        date: NaiveDate,
        done: bool,
    ) -> Result<(), HabitError> {
        let mut data = self.write()?;
        if done {
            data.completions.insert((id, date));
        } else {
            data.completions.remove(&(id, date));
        }
        Ok(())
    }

    /// Adds a vacation period.
    ///
    /// # Errors
    ///
    /// Returns an error if the period ends before it starts.
    pub fn add_vacation(&self, vacation: VacationPeriod) -> Result<(), HabitError> {
        if vacation.end < vacation.start {
            return Err(HabitError::InvalidVacation {
                id: vacation.id,
                reason: "ends before it starts".to_string(),
            }
            .into());
        }
        self.write()?.vacations.push(vacation);
        Ok(())
    }

    /// Removes a vacation period.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger is unusable.
    pub fn remove_vacation(&self, id: VacationId) -> Result<bool, HabitError> {
        let mut data = self.write()?;
        let before = data.vacations.len();
        data.vacations.retain(|v| v.id != id);
        Ok(data.vacations.len() != before)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerData>, HabitError> {
        self.data.read().map_err(|_| {
            HabitError::StoreUnavailable {
                reason: "ledger lock poisoned".to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerData>, HabitError> {
        self.data.write().map_err(|_| {
            HabitError::StoreUnavailable {
                reason: "ledger lock poisoned".to_string(),
            }
            .into()
        })
    }
}

impl HabitLedger for InMemoryHabitLedger {
    fn habits(&self) -> Result<Vec<Habit>, HabitError> {
        Ok(self.read()?.habits.values().cloned().collect())
    }

    fn habit(&self, id: HabitId) -> Result<Option<Habit>, HabitError> {
        Ok(self.read()?.habits.get(&id).cloned())
    }

    fn is_completed(&self, id: HabitId, date: NaiveDate) -> Result<bool, HabitError> {
        Ok(self.read()?.completions.contains(&(id, date)))
    }

    fn vacations(&self) -> Result<Vec<VacationPeriod>, HabitError> {
        Ok(self.read()?.vacations.clone())
    }
}
