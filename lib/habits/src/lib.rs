//! Habits and the reminders they produce.
//!
//! This crate provides:
//!
//! - **Habit model**: habits, their weekly schedule and vacation periods
//! - **Ledger**: read access to habits, completions and vacations
//! - **Predicate**: the fire-time check deciding whether a habit still
//!   needs its reminder
//! - **Producer**: registers habit reminders with the scheduler

pub mod error;
pub mod habit;
pub mod ledger;
pub mod predicate;
pub mod producer;
pub mod vacation;

pub use error::HabitError;
pub use habit::{Habit, HabitSchedule};
pub use ledger::{HabitLedger, InMemoryHabitLedger};
pub use predicate::{HabitReminderPredicate, ReminderDecision, SuppressReason};
pub use producer::HabitReminderProducer;
pub use vacation::VacationPeriod;
