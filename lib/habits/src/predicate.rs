//! Fire-time check for habit reminders.
//!
//! A habit reminder is registered once but evaluated when it is due, so a
//! habit completed at 08:55 does not nag at 09:00.

use crate::error::HabitError;
use crate::ledger::HabitLedger;
use habitual_core::{HabitId, Result};
use habitual_scheduler::{Clock, PredicateError, ShouldShow};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Why a habit reminder was held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// The habit no longer exists.
    HabitMissing,
    /// The habit is archived.
    Archived,
    /// Today is before the habit's start date.
    NotStarted,
    /// The habit's schedule skips today.
    NotScheduledToday,
    /// Today falls in a vacation covering the habit.
    OnVacation,
    /// The habit is already done today.
    CompletedToday,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::HabitMissing => "habit missing",
            Self::Archived => "habit archived",
            Self::NotStarted => "habit not started",
            Self::NotScheduledToday => "not scheduled today",
            Self::OnVacation => "on vacation",
            Self::CompletedToday => "already completed today",
        };
        f.write_str(reason)
    }
}

/// Outcome of evaluating a habit reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderDecision {
    Show,
    Suppress(SuppressReason),
}

/// Decides whether a habit still needs reminding right now.
pub struct HabitReminderPredicate {
    habit_id: HabitId,
    ledger: Arc<dyn HabitLedger>,
    clock: Arc<dyn Clock>,
}

impl HabitReminderPredicate {
    /// Creates a predicate for one habit.
    #[must_use]
    pub fn new(habit_id: HabitId, ledger: Arc<dyn HabitLedger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            habit_id,
            ledger,
            clock,
        }
    }

    /// Evaluates the habit against current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    pub fn evaluate(&self) -> Result<ReminderDecision, HabitError> {
        use ReminderDecision::{Show, Suppress};

        let Some(habit) = self.ledger.habit(self.habit_id)? else {
            return Ok(Suppress(SuppressReason::HabitMissing));
        };
        let today = self.clock.today();

        if habit.archived {
            return Ok(Suppress(SuppressReason::Archived));
        }
        if today < habit.start_date {
            return Ok(Suppress(SuppressReason::NotStarted));
        }
        if !habit.schedule.includes(today) {
            return Ok(Suppress(SuppressReason::NotScheduledToday));
        }
        if self
            .ledger
            .vacations()?
            .iter()
            .any(|v| v.covers(self.habit_id, today))
        {
            return Ok(Suppress(SuppressReason::OnVacation));
        }
        if self.ledger.is_completed(self.habit_id, today)? {
            return Ok(Suppress(SuppressReason::CompletedToday));
        }
        Ok(Show)
    }
}

impl ShouldShow for HabitReminderPredicate {
    /// Never fails: a ledger error shows the reminder rather than losing it.
    fn should_show(&self) -> std::result::Result<bool, PredicateError> {
        match self.evaluate() {
            Ok(ReminderDecision::Show) => Ok(true),
            Ok(ReminderDecision::Suppress(reason)) => {
                debug!(habit_id = %self.habit_id, %reason, "Habit reminder suppressed");
                Ok(false)
            }
            Err(e) => {
                warn!(habit_id = %self.habit_id, error = %e, "Habit check failed, showing anyway");
                Ok(true)
            }
        }
    }
}
