//! In-memory reminder registry keyed by time of day.
//!
//! Invariants:
//! - a slot exists only while it holds at least one reminder
//! - a reminder id appears at most once across all slots

use crate::error::RegisterError;
use crate::reminder::{Reminder, ReminderKind};
use crate::time::TimeOfDay;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Aggregate counts over the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderStats {
    /// Reminders across all slots.
    pub total_reminders: usize,
    /// Distinct times of day.
    pub unique_time_slots: usize,
    /// Reminders per kind.
    pub counts_by_kind: BTreeMap<ReminderKind, usize>,
    /// Size of the fullest slot.
    pub max_in_one_slot: usize,
}

/// A reminder taken out of the registry.
#[derive(Debug)]
pub struct Removed {
    /// The reminder that was removed.
    pub reminder: Reminder,
    /// Whether its slot is now gone.
    pub slot_emptied: bool,
}

/// Reminders grouped into time slots.
#[derive(Debug, Default)]
pub struct ReminderRegistry {
    slots: BTreeMap<TimeOfDay, Vec<Reminder>>,
    index: HashMap<String, TimeOfDay>,
}

impl ReminderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a reminder to its slot.
    ///
    /// Returns whether the slot was created by this insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or already registered in any
    /// slot. The registry is left unchanged.
    pub fn insert(&mut self, reminder: Reminder) -> Result<bool, RegisterError> {
        if reminder.id.is_empty() {
            return Err(RegisterError::EmptyId);
        }
        if let Some(&time) = self.index.get(&reminder.id) {
            return Err(RegisterError::Duplicate {
                id: reminder.id,
                time,
            });
        }

        let time = reminder.time;
        self.index.insert(reminder.id.clone(), time);
        let slot = self.slots.entry(time).or_default();
        slot.push(reminder);
        Ok(slot.len() == 1)
    }

    /// Removes the reminder with the given id, deleting its slot if that
    /// leaves it empty.
    pub fn remove(&mut self, id: &str) -> Option<Removed> {
        let time = self.index.remove(id)?;
        let slot = self.slots.get_mut(&time)?;
        let position = slot.iter().position(|r| r.id == id)?;
        let reminder = slot.remove(position);

        let slot_emptied = slot.is_empty();
        if slot_emptied {
            self.slots.remove(&time);
        }
        Some(Removed {
            reminder,
            slot_emptied,
        })
    }

    /// Removes and returns a whole slot, in registration order.
    pub fn take_slot(&mut self, time: TimeOfDay) -> Vec<Reminder> {
        let reminders = self.slots.remove(&time).unwrap_or_default();
        for reminder in &reminders {
            self.index.remove(&reminder.id);
        }
        reminders
    }

    /// Returns the reminder with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Reminder> {
        let time = self.index.get(id)?;
        self.slots.get(time)?.iter().find(|r| r.id == id)
    }

    /// Returns whether a reminder with the given id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the reminders due at `time`.
    #[must_use]
    pub fn slot(&self, time: TimeOfDay) -> Option<&[Reminder]> {
        self.slots.get(&time).map(Vec::as_slice)
    }

    /// Returns the ids starting with `prefix`.
    #[must_use]
    pub fn ids_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.index
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Returns the occupied times of day, earliest first.
    pub fn times(&self) -> impl Iterator<Item = TimeOfDay> + '_ {
        self.slots.keys().copied()
    }

    /// Returns a copy of every slot.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<TimeOfDay, Vec<Reminder>> {
        self.slots.clone()
    }

    /// Returns the number of registered reminders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Computes aggregate counts.
    #[must_use]
    pub fn stats(&self) -> ReminderStats {
        let mut stats = ReminderStats {
            total_reminders: self.len(),
            unique_time_slots: self.slots.len(),
            ..ReminderStats::default()
        };
        for slot in self.slots.values() {
            stats.max_in_one_slot = stats.max_in_one_slot.max(slot.len());
            for reminder in slot {
                *stats.counts_by_kind.entry(reminder.kind).or_default() += 1;
            }
        }
        stats
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}
