//! The alert payload handed to a sink.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Presentation priority of an alert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Platform-assigned identifier of a presented alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(pub u64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert-{}", self.0)
    }
}

/// A single alert to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Headline.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// Optional icon reference.
    pub icon: Option<String>,
    /// Delivery tag. Alerts sharing a tag replace each other.
    pub tag: String,
    /// Presentation priority.
    pub priority: Priority,
    /// Opaque payload handed back to whoever handles activation.
    pub data: JsonValue,
}

impl Alert {
    /// Creates an alert with the given tag and title.
    #[must_use]
    pub fn new(tag: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: None,
            icon: None,
            tag: tag.into(),
            priority: Priority::default(),
            data: JsonValue::Null,
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

    /// Sets the payload.
    #[must_use]
    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_builder() {
        let alert = Alert::new("tag-1", "Drink water")
            .with_body("Two glasses")
            .with_priority(Priority::High)
            .with_data(serde_json::json!({"habitId": "hab_1"}));

        assert_eq!(alert.tag, "tag-1");
        assert_eq!(alert.body.as_deref(), Some("Two glasses"));
        assert_eq!(alert.priority, Priority::High);
        assert_eq!(alert.data["habitId"], "hab_1");
        assert!(alert.icon.is_none());
    }

    #[test]
    fn priority_orders_low_to_high() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::Normal < Priority::High);
    }
}
