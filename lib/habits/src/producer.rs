//! Registers habit reminders with the scheduler.
//!
//! Every reminder time of a habit becomes one [`Reminder`] with id
//! `habit-{HabitId}-{HH:mm}` and a [`HabitReminderPredicate`], so whether it
//! is shown is decided when it fires. Slots are one-shot, so callers run
//! [`HabitReminderProducer::resync`] on start, on habit changes and at each
//! day rollover.

use crate::error::HabitError;
use crate::habit::Habit;
use crate::ledger::HabitLedger;
use crate::predicate::HabitReminderPredicate;
use habitual_core::{HabitId, Result};
use habitual_scheduler::{Clock, Reminder, ReminderKind, ReminderScheduler, TimeOfDay};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns habits into scheduled reminders.
#[derive(Clone)]
pub struct HabitReminderProducer {
    scheduler: ReminderScheduler,
    ledger: Arc<dyn HabitLedger>,
    clock: Arc<dyn Clock>,
}

impl HabitReminderProducer {
    #[must_use]
    pub fn new(
        scheduler: ReminderScheduler,
        ledger: Arc<dyn HabitLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scheduler,
            ledger,
            clock,
        }
    }

    /// Returns the id used for a habit's reminder at `time`.
    #[must_use]
    pub fn reminder_id(habit: HabitId, time: TimeOfDay) -> String {
        format!("{}{time}", Self::id_prefix(habit))
    }

    fn id_prefix(habit: HabitId) -> String {
        format!("{}-{habit}-", ReminderKind::Habit)
    }

    /// Registers one reminder per distinct reminder time of `habit`.
    ///
    /// Archived habits get none. Times already registered are left alone.
    /// Returns how many reminders were newly registered.
    pub fn schedule_habit(&self, habit: &Habit) -> usize {
        if habit.archived {
            debug!(habit_id = %habit.id, "Skipping archived habit");
            return 0;
        }

        let times: BTreeSet<TimeOfDay> = habit.reminder_times.iter().copied().collect();
        times
            .into_iter()
            .filter(|time| self.scheduler.register(self.reminder_for(habit, *time)))
            .count()
    }

    fn reminder_for(&self, habit: &Habit, time: TimeOfDay) -> Reminder {
        let predicate =
            HabitReminderPredicate::new(habit.id, self.ledger.clone(), self.clock.clone());
        let mut reminder = Reminder::new(
            Self::reminder_id(habit.id, time),
            ReminderKind::Habit,
            time,
            habit.display_name(),
        )
        .with_body(format!("Time for {}", habit.name))
        .with_data("habitId", habit.id.to_string())
        .with_data("time", time.to_string())
        .with_should_show(predicate);
        if let Some(icon) = &habit.icon {
            reminder = reminder.with_icon(icon.clone());
        }
        reminder
    }

    /// Removes every reminder belonging to the habit.
    ///
    /// Returns how many were removed.
    pub fn unschedule_habit(&self, habit: HabitId) -> usize {
        self.scheduler.unregister_matching(&Self::id_prefix(habit))
    }

    /// Replaces a habit's reminders after it changed.
    pub fn reschedule_habit(&self, habit: &Habit) -> usize {
        self.unschedule_habit(habit.id);
        self.schedule_habit(habit)
    }

    /// Drops all habit reminders and registers them again from the ledger.
    ///
    /// Returns how many reminders are registered afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read. Existing reminders are
    /// kept in that case.
    pub fn resync(&self) -> Result<usize, HabitError> {
        let habits = self.ledger.habits()?;
        let removed = self
            .scheduler
            .unregister_matching(&format!("{}-", ReminderKind::Habit));
        let registered: usize = habits.iter().map(|h| self.schedule_habit(h)).sum();
        info!(
            habits = habits.len(),
            removed, registered, "Resynced habit reminders"
        );
        Ok(registered)
    }
}
