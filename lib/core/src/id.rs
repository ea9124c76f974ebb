//! Strongly-typed ID types for habit-tracking entities.
//!
//! IDs wrap a ULID and display with a short type prefix, so they can be
//! embedded in reminder identifiers without colliding across entity types.
//! They serialize as the bare ULID.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Generates a ULID-backed ID newtype with a display prefix.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Creates a new ID with a randomly generated ULID.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a habit.
    HabitId,
    "hab"
);

define_id!(
    /// Unique identifier for a vacation period.
    VacationId,
    "vac"
);
