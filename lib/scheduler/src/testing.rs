//! Test doubles shared by the scheduler's unit tests.

use async_trait::async_trait;
use habitual_notify::{Alert, DeliveryHandle, NotificationSink, NotifyError, PermissionStatus};
use rootcause::prelude::Report;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Sink that records every alert it is asked to show.
#[derive(Default)]
pub struct RecordingSink {
    pub shown: Mutex<Vec<Alert>>,
    pub failing_tags: Mutex<HashSet<String>>,
    pub cancelled: Arc<AtomicUsize>,
    pub hook: Mutex<Option<Box<dyn Fn() + Send>>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, tag: &str) {
        self.failing_tags.lock().unwrap().insert(tag.to_string());
    }

    /// Runs `hook` after every accepted alert.
    pub fn on_show(&self, hook: impl Fn() + Send + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn shown(&self) -> Vec<Alert> {
        self.shown.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn show(&self, alert: Alert) -> Result<DeliveryHandle, Report<NotifyError>> {
        if self.failing_tags.lock().unwrap().contains(&alert.tag) {
            return Err(NotifyError::ShowFailed {
                tag: alert.tag,
                reason: "surface unavailable".to_string(),
            }
            .into());
        }
        self.shown.lock().unwrap().push(alert);
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook();
        }
        let cancelled = Arc::clone(&self.cancelled);
        Ok(DeliveryHandle::new(move || {
            cancelled.fetch_add(1, Ordering::SeqCst);
        }))
    }
}
