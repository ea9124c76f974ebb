//! Day rollover: fired slots are one-shot, so every habit reminder is
//! registered again shortly after local midnight.

use chrono::{NaiveDateTime, TimeDelta};
use habitual_habits::HabitReminderProducer;
use habitual_scheduler::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Returns the local wall time one second after the midnight that follows
/// `now`, when the clock has surely reached the new day.
#[must_use]
pub fn next_day_start(now: NaiveDateTime) -> NaiveDateTime {
    let midnight = now
        .date()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now + TimeDelta::days(1));
    midnight + TimeDelta::seconds(1)
}

/// Returns how long to wait on `clock` until just past the next midnight.
#[must_use]
pub fn until_next_day(clock: &dyn Clock) -> Duration {
    clock.duration_until(next_day_start(clock.now()))
}

/// Resyncs habit reminders after every midnight, forever.
pub async fn resync_daily(producer: HabitReminderProducer, clock: Arc<dyn Clock>) {
    loop {
        let wait = until_next_day(clock.as_ref());
        tokio::time::sleep(wait).await;

        info!(day = %clock.today(), "Day rolled over");
        if let Err(e) = producer.resync() {
            error!(error = %e, "Failed to resync habit reminders");
        }
    }
}
