//! Reminder scheduler.
//!
//! This crate provides:
//!
//! - **Reminders**: time-of-day alert requests with an optional fire-time
//!   suppression predicate
//! - **Registry**: reminders grouped into time slots, unique by id
//! - **Timer armer**: one deferred callback per distinct time of day
//! - **Dispatcher**: predicate filtering and single or grouped delivery
//! - **ReminderScheduler**: the facade producers register against

pub mod clock;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod reminder;
pub mod scheduler;
pub mod time;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatch::{DeliveryDispatcher, DispatchReport, GroupingConfig, GroupingPatch};
pub use error::{PredicateError, RegisterError, TimeOfDayError, TimerError};
pub use registry::{ReminderRegistry, ReminderStats};
pub use reminder::{Reminder, ReminderKind, ReminderPatch, ShouldShow};
pub use scheduler::ReminderScheduler;
pub use time::TimeOfDay;
pub use timer::{TimerArmer, TimerToken};
