//! Habit definitions.

use chrono::{Datelike, NaiveDate, Weekday};
use habitual_core::HabitId;
use habitual_scheduler::TimeOfDay;
use serde::{Deserialize, Serialize};

/// Which days a habit is practised on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitSchedule {
    /// Every day.
    #[default]
    Daily,
    /// Only on the listed weekdays.
    Weekdays { days: Vec<Weekday> },
}

impl HabitSchedule {
    /// Returns whether the habit is practised on `date`.
    #[must_use]
    pub fn includes(&self, date: NaiveDate) -> bool {
        match self {
            Self::Daily => true,
            Self::Weekdays { days } => days.contains(&date.weekday()),
        }
    }
}

/// A habit the user tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// First day the habit counts.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub schedule: HabitSchedule,
    /// Times of day to be reminded at.
    #[serde(default)]
    pub reminder_times: Vec<TimeOfDay>,
    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    /// Creates a daily habit with no reminders.
    #[must_use]
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: HabitId::new(),
            name: name.into(),
            icon: None,
            start_date,
            schedule: HabitSchedule::Daily,
            reminder_times: Vec::new(),
            archived: false,
        }
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: HabitSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Adds a reminder time.
    #[must_use]
    pub fn with_reminder_at(mut self, time: TimeOfDay) -> Self {
        self.reminder_times.push(time);
        self
    }

    /// Returns the name prefixed with the icon, if any.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{icon} {}", self.name),
            None => self.name.clone(),
        }
    }

    /// Returns whether the habit is practised on `date`, ignoring
    /// completions and vacations.
    #[must_use]
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        !self.archived && date >= self.start_date && self.schedule.includes(date)
    }
}
