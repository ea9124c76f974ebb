//! Habit reminder daemon.
//!
//! Loads habits and vacations from JSON files, registers their reminders
//! with a [`ReminderScheduler`](habitual_scheduler::ReminderScheduler) and
//! shows them through the console notification host. Reminders are
//! registered again after every local midnight.

pub mod config;
pub mod error;
pub mod load;
pub mod rollover;

pub use config::{NotificationsConfig, ReminderdConfig};
pub use error::StartupError;
