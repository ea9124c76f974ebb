//! Core types shared by the habitual crates.
//!
//! This crate provides the rootcause-based `Result` alias and the
//! strongly-typed identifiers for habit-tracking entities.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{HabitId, VacationId};
