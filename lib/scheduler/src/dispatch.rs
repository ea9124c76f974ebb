//! Fire-time delivery: predicate filtering, grouping, and handing alerts
//! to the sink.

use crate::reminder::{Reminder, ReminderKind};
use crate::time::TimeOfDay;
use habitual_notify::{Alert, DeliveryHandle, NotificationSink, Priority};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, warn};

/// When simultaneous reminders are merged into one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Whether grouping happens at all.
    pub enabled: bool,
    /// Smallest number of eligible reminders that gets grouped.
    pub min_count: usize,
    /// Whether the grouped body has one line per kind.
    pub group_by_type: bool,
}

impl GroupingConfig {
    /// Returns whether `eligible` reminders should be delivered as one alert.
    #[must_use]
    pub fn should_group(&self, eligible: usize) -> bool {
        self.enabled && eligible >= self.min_count.max(1)
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_count: 2,
            group_by_type: true,
        }
    }
}

/// A partial update to [`GroupingConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupingPatch {
    /// New value for [`GroupingConfig::enabled`].
    pub enabled: Option<bool>,
    /// New value for [`GroupingConfig::min_count`].
    pub min_count: Option<usize>,
    /// New value for [`GroupingConfig::group_by_type`].
    pub group_by_type: Option<bool>,
}

impl GroupingPatch {
    /// Merges the patch over `config`. `min_count` is clamped to at least 1.
    pub fn apply(&self, config: &mut GroupingConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(min_count) = self.min_count {
            config.min_count = min_count.max(1);
        }
        if let Some(group_by_type) = self.group_by_type {
            config.group_by_type = group_by_type;
        }
    }
}

/// What happened when a slot fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// The slot's time.
    pub time: TimeOfDay,
    /// Reminders whose predicate allowed delivery.
    pub eligible: usize,
    /// Reminders dropped by their predicate.
    pub suppressed: usize,
    /// Alerts the sink accepted.
    pub delivered: usize,
    /// Alerts the sink failed to show.
    pub failed: usize,
    /// Alerts withdrawn because every delivery was cancelled mid-dispatch.
    pub dropped: usize,
    /// Whether the eligible reminders went out as one alert.
    pub grouped: bool,
}

enum Outcome {
    Delivered,
    Failed,
    Dropped,
}

/// Delivers fired slots to a sink.
///
/// Each [`DeliveryDispatcher::cancel_all`] starts a new generation. A
/// dispatch started in an earlier generation shows nothing more and
/// cancels any alert the sink accepted after the cut.
pub struct DeliveryDispatcher {
    sink: Arc<dyn NotificationSink>,
    handles: Mutex<HashMap<String, DeliveryHandle>>,
    generation: AtomicU64,
}

impl DeliveryDispatcher {
    /// Creates a dispatcher delivering to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            handles: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the sink.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn NotificationSink> {
        &self.sink
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Delivers the reminders of one fired slot.
    pub fn dispatch(
        &self,
        time: TimeOfDay,
        reminders: Vec<Reminder>,
        config: &GroupingConfig,
    ) -> DispatchReport {
        self.dispatch_since(self.generation(), time, reminders, config)
    }

    /// Delivers the reminders of a slot taken during `generation`.
    pub fn dispatch_since(
        &self,
        generation: u64,
        time: TimeOfDay,
        reminders: Vec<Reminder>,
        config: &GroupingConfig,
    ) -> DispatchReport {
        let total = reminders.len();
        let eligible: Vec<Reminder> = reminders.into_iter().filter(is_eligible).collect();

        let mut report = DispatchReport {
            time,
            eligible: eligible.len(),
            suppressed: total - eligible.len(),
            delivered: 0,
            failed: 0,
            dropped: 0,
            grouped: false,
        };
        if eligible.is_empty() {
            debug!(%time, suppressed = report.suppressed, "No reminders left to deliver");
            return report;
        }

        let alerts = if config.should_group(eligible.len()) {
            report.grouped = true;
            vec![grouped_alert(time, &eligible, config.group_by_type)]
        } else {
            eligible.iter().map(Reminder::to_alert).collect()
        };
        for alert in alerts {
            match self.deliver(alert, generation) {
                Outcome::Delivered => report.delivered += 1,
                Outcome::Failed => report.failed += 1,
                Outcome::Dropped => report.dropped += 1,
            }
        }
        report
    }

    fn deliver(&self, alert: Alert, generation: u64) -> Outcome {
        let tag = alert.tag.clone();
        if self.generation() != generation {
            debug!(%tag, "Deliveries cancelled, not showing reminder");
            return Outcome::Dropped;
        }

        let handle = match self.sink.show(alert) {
            Ok(handle) => handle,
            Err(e) => {
                error!(%tag, error = %e, "Failed to deliver reminder");
                return Outcome::Failed;
            }
        };
        if handle.is_inert() {
            return Outcome::Delivered;
        }

        let late = {
            let mut handles = self.lock_handles();
            if self.generation() == generation {
                handles.insert(tag.clone(), handle);
                None
            } else {
                Some(handle)
            }
        };
        match late {
            None => Outcome::Delivered,
            Some(handle) => {
                debug!(%tag, "Deliveries cancelled while showing, withdrawing reminder");
                handle.cancel();
                Outcome::Dropped
            }
        }
    }

    /// Returns how many delivery handles are held.
    #[must_use]
    pub fn retained_handles(&self) -> usize {
        self.lock_handles().len()
    }

    /// Cancels every retained delivery and returns how many there were.
    ///
    /// Also starts a new generation, so dispatches already under way
    /// deliver nothing further.
    pub fn cancel_all(&self) -> usize {
        let handles: Vec<DeliveryHandle> = {
            let mut handles = self.lock_handles();
            self.generation.fetch_add(1, Ordering::SeqCst);
            handles.drain().map(|(_, h)| h).collect()
        };
        let count = handles.len();
        for handle in handles {
            handle.cancel();
        }
        count
    }

    fn lock_handles(&self) -> std::sync::MutexGuard<'_, HashMap<String, DeliveryHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_eligible(reminder: &Reminder) -> bool {
    let Some(predicate) = &reminder.should_show else {
        return true;
    };

    match panic::catch_unwind(AssertUnwindSafe(|| predicate.should_show())) {
        Ok(Ok(true)) => true,
        Ok(Ok(false)) => {
            debug!(reminder_id = %reminder.id, "Reminder suppressed by predicate");
            false
        }
        Ok(Err(e)) => {
            warn!(reminder_id = %reminder.id, error = %e, "Reminder predicate failed, skipping");
            false
        }
        Err(_) => {
            warn!(reminder_id = %reminder.id, "Reminder predicate panicked, skipping");
            false
        }
    }
}

/// Builds the single alert that stands in for several reminders.
#[must_use]
pub fn grouped_alert(time: TimeOfDay, reminders: &[Reminder], group_by_type: bool) -> Alert {
    let body = if group_by_type {
        ReminderKind::ALL
            .iter()
            .filter_map(|&kind| {
                let titles: Vec<&str> = reminders
                    .iter()
                    .filter(|r| r.kind == kind)
                    .map(|r| r.title.as_str())
                    .collect();
                (!titles.is_empty()).then(|| {
                    format!("{} {}: {}", kind.glyph(), kind.label(), titles.join(", "))
                })
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        reminders
            .iter()
            .map(|r| format!("• {}", r.title))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let constituents: Vec<JsonValue> = reminders
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "kind": r.kind,
                "data": JsonValue::Object(r.data.clone()),
            })
        })
        .collect();

    let priority = reminders
        .iter()
        .map(|r| r.priority)
        .max()
        .unwrap_or(Priority::Normal);

    Alert::new(
        format!("group-{time}"),
        format!("{} reminders due", reminders.len()),
    )
    .with_body(body)
    .with_priority(priority)
    .with_data(json!({
        "grouped": true,
        "time": time,
        "reminders": constituents,
    }))
}
