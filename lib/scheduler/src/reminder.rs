//! The reminder data model.

use crate::error::PredicateError;
use crate::time::TimeOfDay;
use habitual_notify::{Alert, Priority};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

/// Decides at fire time whether a reminder is still wanted.
///
/// Called exactly once per firing, never at registration, so the answer
/// reflects the state of the world when the reminder is due.
pub trait ShouldShow: Send + Sync {
    /// Returns whether the reminder should be delivered now.
    ///
    /// # Errors
    ///
    /// An error excludes the reminder from this delivery.
    fn should_show(&self) -> Result<bool, PredicateError>;
}

impl<F> ShouldShow for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn should_show(&self) -> Result<bool, PredicateError> {
        Ok(self())
    }
}

/// What kind of entity a reminder is about.
///
/// Only used to lay out grouped alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Habit,
    Task,
    Event,
    Other,
}

impl ReminderKind {
    /// Every kind, in grouped-alert order.
    pub const ALL: [Self; 4] = [Self::Habit, Self::Task, Self::Event, Self::Other];

    /// Returns the string representation, also used as the id prefix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Habit => "habit",
            Self::Task => "task",
            Self::Event => "event",
            Self::Other => "other",
        }
    }

    /// Returns the glyph shown before this kind's line in a grouped alert.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Habit => "🎯",
            Self::Task => "📋",
            Self::Event => "📅",
            Self::Other => "🔔",
        }
    }

    /// Returns the plural label used in grouped alerts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Habit => "Habits",
            Self::Task => "Tasks",
            Self::Event => "Events",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scheduled alert request.
#[derive(Clone)]
pub struct Reminder {
    /// Globally unique id, conventionally `{kind}-{entityId}-{HH:mm}`.
    pub id: String,
    /// Entity kind.
    pub kind: ReminderKind,
    /// When the reminder is due.
    pub time: TimeOfDay,
    /// Alert title.
    pub title: String,
    /// Alert body.
    pub body: Option<String>,
    /// Alert icon.
    pub icon: Option<String>,
    /// Alert priority.
    pub priority: Priority,
    /// Opaque payload handed to the delivery target.
    pub data: Map<String, JsonValue>,
    /// Fire-time suppression check. `None` means always deliver.
    pub should_show: Option<Arc<dyn ShouldShow>>,
}

impl Reminder {
    /// Creates a reminder with no body, icon, payload or predicate.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: ReminderKind,
        time: TimeOfDay,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            time,
            title: title.into(),
            body: None,
            icon: None,
            priority: Priority::default(),
            data: Map::new(),
            should_show: None,
        }
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a payload entry.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Sets the fire-time predicate.
    #[must_use]
    pub fn with_should_show(mut self, predicate: impl ShouldShow + 'static) -> Self {
        self.should_show = Some(Arc::new(predicate));
        self
    }

    /// Builds the alert for delivering this reminder on its own.
    #[must_use]
    pub fn to_alert(&self) -> Alert {
        Alert {
            title: self.title.clone(),
            body: self.body.clone(),
            icon: self.icon.clone(),
            tag: self.id.clone(),
            priority: self.priority,
            data: JsonValue::Object(self.data.clone()),
        }
    }
}

impl fmt::Debug for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reminder")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("time", &self.time)
            .field("title", &self.title)
            .field("body", &self.body)
            .field("icon", &self.icon)
            .field("priority", &self.priority)
            .field("data", &self.data)
            .field("should_show", &self.should_show.is_some())
            .finish()
    }
}

/// Fields to change on an existing reminder. The id cannot change.
#[derive(Clone, Default)]
pub struct ReminderPatch {
    /// New kind.
    pub kind: Option<ReminderKind>,
    /// New time of day; moves the reminder to that slot.
    pub time: Option<TimeOfDay>,
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub body: Option<String>,
    /// New icon.
    pub icon: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// Replacement payload.
    pub data: Option<Map<String, JsonValue>>,
    /// Replacement fire-time predicate.
    pub should_show: Option<Arc<dyn ShouldShow>>,
}

impl ReminderPatch {
    /// Moves the reminder to another time of day.
    #[must_use]
    pub fn with_time(mut self, time: TimeOfDay) -> Self {
        self.time = Some(time);
        self
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Replaces the predicate.
    #[must_use]
    pub fn with_should_show(mut self, predicate: impl ShouldShow + 'static) -> Self {
        self.should_show = Some(Arc::new(predicate));
        self
    }

    /// Merges the patch over `reminder`.
    pub fn apply(self, reminder: &mut Reminder) {
        if let Some(kind) = self.kind {
            reminder.kind = kind;
        }
        if let Some(time) = self.time {
            reminder.time = time;
        }
        if let Some(title) = self.title {
            reminder.title = title;
        }
        if let Some(body) = self.body {
            reminder.body = Some(body);
        }
        if let Some(icon) = self.icon {
            reminder.icon = Some(icon);
        }
        if let Some(priority) = self.priority {
            reminder.priority = priority;
        }
        if let Some(data) = self.data {
            reminder.data = data;
        }
        if let Some(should_show) = self.should_show {
            reminder.should_show = Some(should_show);
        }
    }
}

impl fmt::Debug for ReminderPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderPatch")
            .field("kind", &self.kind)
            .field("time", &self.time)
            .field("title", &self.title)
            .field("body", &self.body)
            .field("icon", &self.icon)
            .field("priority", &self.priority)
            .field("data", &self.data)
            .field("should_show", &self.should_show.is_some())
            .finish()
    }
}
