//! One deferred callback per time of day.
//!
//! Each armed timer is a Tokio task sleeping until the next occurrence of
//! its time. Every arming gets a fresh [`TimerToken`]; the fire callback
//! receives it and must call [`TimerArmer::complete`], which only succeeds
//! while that token is still current. A task that wakes after its timer was
//! disarmed therefore finds nothing to do.

use crate::clock::Clock;
use crate::error::TimerError;
use crate::time::TimeOfDay;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tokio::task::AbortHandle;
use tracing::debug;

/// Identifies one arming of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug)]
struct ArmedTimer {
    token: TimerToken,
    fires_at: NaiveDateTime,
    task: AbortHandle,
}

/// Owns the armed timers, at most one per time of day.
#[derive(Debug, Default)]
pub struct TimerArmer {
    timers: HashMap<TimeOfDay, ArmedTimer>,
    next_token: u64,
}

impl TimerArmer {
    /// Creates an armer with no timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a timer for the next occurrence of `time` on `clock`.
    ///
    /// If `time` already has a timer, nothing changes and its token is
    /// returned. Otherwise `on_fire` runs once, at fire time, with the new
    /// token.
    ///
    /// # Errors
    ///
    /// Returns an error if called outside a Tokio runtime.
    pub fn arm<F>(
        &mut self,
        time: TimeOfDay,
        clock: &dyn Clock,
        on_fire: F,
    ) -> Result<TimerToken, TimerError>
    where
        F: FnOnce(TimerToken) + Send + 'static,
    {
        if let Some(existing) = self.timers.get(&time) {
            return Ok(existing.token);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerError::NoRuntime)?;

        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let (fires_at, delay) = time.next_from(clock);

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(token);
        });

        debug!(%time, %fires_at, delay_secs = delay.as_secs(), "Armed reminder timer");
        self.timers.insert(
            time,
            ArmedTimer {
                token,
                fires_at,
                task: task.abort_handle(),
            },
        );
        Ok(token)
    }

    /// Cancels the timer for `time`.
    ///
    /// Returns whether a timer was armed.
    pub fn disarm(&mut self, time: TimeOfDay) -> bool {
        match self.timers.remove(&time) {
            Some(timer) => {
                timer.task.abort();
                debug!(%time, "Disarmed reminder timer");
                true
            }
            None => false,
        }
    }

    /// Retires the timer for `time` after it fired.
    ///
    /// Returns false if `token` is stale, meaning the timer was disarmed
    /// (and possibly re-armed) after this firing was scheduled.
    pub fn complete(&mut self, time: TimeOfDay, token: TimerToken) -> bool {
        match self.timers.get(&time) {
            Some(timer) if timer.token == token => {
                self.timers.remove(&time);
                true
            }
            _ => false,
        }
    }

    /// Returns whether `time` has an armed timer.
    #[must_use]
    pub fn is_armed(&self, time: TimeOfDay) -> bool {
        self.timers.contains_key(&time)
    }

    /// Returns when the timer for `time` will fire.
    #[must_use]
    pub fn fires_at(&self, time: TimeOfDay) -> Option<NaiveDateTime> {
        self.timers.get(&time).map(|timer| timer.fires_at)
    }

    /// Returns the number of armed timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns whether no timer is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Cancels every timer and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.timers.len();
        for (_, timer) in self.timers.drain() {
            timer.task.abort();
        }
        count
    }
}

impl Drop for TimerArmer {
    fn drop(&mut self) {
        self.clear();
    }
}
