//! Wall-clock sources.
//!
//! The scheduler works in local wall-clock time. Timers are computed from
//! a [`Clock`] so tests can pin "now" and the zone's offset rules.
//!
//! Wall times are mapped to real instants through [`Clock::instant_at`]:
//! a time repeated when clocks fall back resolves to its earliest instant,
//! and a time skipped when clocks spring forward resolves to the first
//! minute after the gap.

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use std::sync::{PoisonError, RwLock};

/// Longest offset jump searched past when a wall time falls in a gap.
const MAX_GAP_MINUTES: u32 = 24 * 60;

/// A source of the current local date and time.
pub trait Clock: Send + Sync {
    /// Returns the current instant with its local offset.
    fn now_local(&self) -> DateTime<FixedOffset>;

    /// Maps a local wall time to the instants it names in this zone.
    fn resolve(&self, local: NaiveDateTime) -> LocalResult<DateTime<FixedOffset>>;

    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime {
        self.now_local().naive_local()
    }

    /// Returns the current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Returns the instant a local wall time occurs at.
    fn instant_at(&self, local: NaiveDateTime) -> DateTime<FixedOffset> {
        let mut candidate = local;
        for _ in 0..=MAX_GAP_MINUTES {
            match self.resolve(candidate) {
                LocalResult::Single(at) => return at,
                LocalResult::Ambiguous(earliest, _) => return earliest,
                LocalResult::None => candidate += TimeDelta::minutes(1),
            }
        }

        // No zone skips a whole day; read the wall time as UTC.
        DateTime::from_naive_utc_and_offset(local, Utc.fix())
    }

    /// Returns the real time from now until the wall time `local`.
    ///
    /// Zero if `local` is not in the future.
    fn duration_until(&self, local: NaiveDateTime) -> std::time::Duration {
        (self.instant_at(local) - self.now_local())
            .to_std()
            .unwrap_or_default()
    }
}

/// The system's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> DateTime<FixedOffset> {
        chrono::Local::now().fixed_offset()
    }

    fn resolve(&self, local: NaiveDateTime) -> LocalResult<DateTime<FixedOffset>> {
        chrono::Local
            .from_local_datetime(&local)
            .map(|at| at.fixed_offset())
    }
}

/// A clock that only moves when told to.
///
/// Runs at UTC unless given another offset. Offset changes can be added
/// with [`ManualClock::with_transition`] to model daylight saving.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<NaiveDateTime>,
    offset: FixedOffset,
    transitions: Vec<(NaiveDateTime, FixedOffset)>,
}

impl ManualClock {
    /// Creates a clock whose local time is fixed at `now`.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: RwLock::new(now),
            offset: Utc.fix(),
            transitions: Vec::new(),
        }
    }

    /// Sets the offset in effect before any transition.
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Switches to `offset` at the UTC instant `at_utc`.
    #[must_use]
    pub fn with_transition(mut self, at_utc: NaiveDateTime, offset: FixedOffset) -> Self {
        self.transitions.push((at_utc, offset));
        self.transitions.sort_by_key(|(at, _)| *at);
        self
    }

    /// Moves the clock to the local time `now`.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Moves the clock's local time forward.
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    fn offset_at_utc(&self, utc: NaiveDateTime) -> FixedOffset {
        self.transitions
            .iter()
            .take_while(|(at, _)| *at <= utc)
            .last()
            .map_or(self.offset, |(_, offset)| *offset)
    }
}

impl Clock for ManualClock {
    fn now_local(&self) -> DateTime<FixedOffset> {
        let now = *self.now.read().unwrap_or_else(PoisonError::into_inner);
        self.instant_at(now)
    }

    fn resolve(&self, local: NaiveDateTime) -> LocalResult<DateTime<FixedOffset>> {
        let mut matches: Vec<DateTime<FixedOffset>> = std::iter::once(self.offset)
            .chain(self.transitions.iter().map(|(_, offset)| *offset))
            .filter_map(|offset| {
                let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
                (self.offset_at_utc(utc) == offset)
                    .then(|| DateTime::from_naive_utc_and_offset(utc, offset))
            })
            .collect();
        matches.sort();
        matches.dedup();

        match matches.as_slice() {
            [] => LocalResult::None,
            [single] => LocalResult::Single(*single),
            [earliest, .., latest] => LocalResult::Ambiguous(*earliest, *latest),
        }
    }
}
