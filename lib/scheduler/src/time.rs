//! Wall-clock time of day at minute resolution.

use crate::clock::Clock;
use crate::error::TimeOfDayError;
use chrono::{Days, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A time of day with no date component, e.g. `09:30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Creates a time of day.
    ///
    /// # Errors
    ///
    /// Returns an error if `hour >= 24` or `minute >= 60`.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeOfDayError> {
        if hour >= 24 || minute >= 60 {
            return Err(TimeOfDayError::OutOfRange { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Returns the hour (0-23).
    #[must_use]
    pub fn hour(self) -> u32 {
        u32::from(self.hour)
    }

    /// Returns the minute (0-59).
    #[must_use]
    pub fn minute(self) -> u32 {
        u32::from(self.minute)
    }

    /// Returns the time of day as a chrono time.
    #[must_use]
    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Returns the minute-truncated time of day of `at`.
    #[must_use]
    pub fn of(at: NaiveDateTime) -> Self {
        Self {
            hour: at.hour() as u8,
            minute: at.minute() as u8,
        }
    }

    /// Returns the next moment this time of day occurs after `now`.
    ///
    /// That is today if the time is still strictly ahead, otherwise the
    /// same time tomorrow.
    #[must_use]
    pub fn next_occurrence_after(self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.as_naive_time());
        if today > now {
            today
        } else {
            today.checked_add_days(Days::new(1)).unwrap_or(today)
        }
    }

    /// Returns the next occurrence on `clock` and the real time until it.
    ///
    /// The wait is measured between real instants, so it stays right on
    /// days when the clock's offset changes.
    #[must_use]
    pub fn next_from(self, clock: &dyn Clock) -> (NaiveDateTime, Duration) {
        let fires_at = self.next_occurrence_after(clock.now());
        (fires_at, clock.duration_until(fires_at))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeOfDayError::Malformed {
            value: s.to_string(),
        };

        let (hour, minute) = s.trim().split_once(':').ok_or_else(malformed)?;
        let digits = |part: &str, max_len: usize| {
            !part.is_empty() && part.len() <= max_len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(hour, 2) || !digits(minute, 2) || minute.len() != 2 {
            return Err(malformed());
        }

        let hour = hour.parse().map_err(|_| malformed())?;
        let minute = minute.parse().map_err(|_| malformed())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeOfDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::clock::tests::{local, new_york};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn parses_and_displays_hh_mm() {
        let time: TimeOfDay = "09:05".parse().expect("valid");
        assert_eq!(time.hour(), 9);
        assert_eq!(time.minute(), 5);
        assert_eq!(time.to_string(), "09:05");

        let short: TimeOfDay = "7:30".parse().expect("single digit hour");
        assert_eq!(short.to_string(), "07:30");
    }

    #[test]
    fn rejects_malformed_values() {
        for value in ["", "0900", "9:5", "24:00", "12:60", "ab:cd", "12:00:00", "-1:00"] {
            assert!(value.parse::<TimeOfDay>().is_err(), "accepted {value:?}");
        }
    }

    #[test]
    fn orders_chronologically() {
        let early: TimeOfDay = "08:59".parse().unwrap();
        let late: TimeOfDay = "09:00".parse().unwrap();
        assert!(early < late);
    }

    #[test]
    fn next_occurrence_is_today_when_ahead() {
        let time: TimeOfDay = "09:00".parse().unwrap();
        let clock = ManualClock::new(at(8, 59, 30));
        assert_eq!(
            time.next_from(&clock),
            (at(9, 0, 0), Duration::from_secs(30))
        );
    }

    #[test]
    fn next_occurrence_is_tomorrow_when_passed_or_now() {
        let time: TimeOfDay = "09:00".parse().unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2026, 3, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        assert_eq!(time.next_occurrence_after(at(9, 0, 0)), tomorrow);
        assert_eq!(time.next_occurrence_after(at(17, 45, 0)), tomorrow);
    }

    #[test]
    fn wait_counts_real_time_on_spring_forward_day() {
        let time: TimeOfDay = "09:00".parse().unwrap();
        let clock = new_york(local(2026, 3, 8, 0, 0, 1));

        let (fires_at, wait) = time.next_from(&clock);

        assert_eq!(fires_at, local(2026, 3, 8, 9, 0, 0));
        assert_eq!(wait, Duration::from_secs(28_799));
    }

    #[test]
    fn wait_counts_real_time_on_fall_back_day() {
        let time: TimeOfDay = "09:00".parse().unwrap();
        let clock = new_york(local(2026, 11, 1, 0, 0, 1));

        assert_eq!(time.next_from(&clock).1, Duration::from_secs(35_999));
    }

    #[test]
    fn skipped_wall_time_fires_when_the_gap_ends() {
        let time: TimeOfDay = "02:30".parse().unwrap();
        let clock = new_york(local(2026, 3, 8, 0, 0, 1));

        assert_eq!(time.next_from(&clock).1, Duration::from_secs(2 * 3600 - 1));
    }

    #[test]
    fn serde_uses_hh_mm_strings() {
        let time: TimeOfDay = serde_json::from_str("\"21:15\"").expect("deserialize");
        assert_eq!(time, TimeOfDay::new(21, 15).unwrap());
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"21:15\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"nope\"").is_err());
    }
}
