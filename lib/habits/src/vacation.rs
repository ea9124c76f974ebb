//! Vacation periods: date ranges during which habits are paused.

use chrono::NaiveDate;
use habitual_core::{HabitId, VacationId};
use serde::{Deserialize, Serialize};

/// A paused date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationPeriod {
    pub id: VacationId,
    /// First paused day.
    pub start: NaiveDate,
    /// Last paused day, inclusive.
    pub end: NaiveDate,
    /// Habits the pause applies to; `None` pauses every habit.
    #[serde(default)]
    pub habits: Option<Vec<HabitId>>,
}

impl VacationPeriod {
    /// Creates a vacation covering every habit.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: VacationId::new(),
            start,
            end,
            habits: None,
        }
    }

    /// Restricts the vacation to the given habits.
    #[must_use]
    pub fn for_habits(mut self, habits: Vec<HabitId>) -> Self {
        self.habits = Some(habits);
        self
    }

    /// Returns whether `habit` is paused on `date`.
    #[must_use]
    pub fn covers(&self, habit: HabitId, date: NaiveDate) -> bool {
        if date < self.start || date > self.end {
            return false;
        }
        self.habits
            .as_ref()
            .is_none_or(|habits| habits.contains(&habit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, day).unwrap()
    }

    #[test]
    fn covers_inclusive_range() {
        let vacation = VacationPeriod::new(date(10), date(12));
        let habit = HabitId::new();

        assert!(!vacation.covers(habit, date(9)));
        assert!(vacation.covers(habit, date(10)));
        assert!(vacation.covers(habit, date(12)));
        assert!(!vacation.covers(habit, date(13)));
    }

    #[test]
    fn scoped_vacation_only_covers_listed_habits() {
        let paused = HabitId::new();
        let other = HabitId::new();
        let vacation = VacationPeriod::new(date(1), date(31)).for_habits(vec![paused]);

        assert!(vacation.covers(paused, date(15)));
        assert!(!vacation.covers(other, date(15)));
    }
}
