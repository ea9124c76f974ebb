//! A notification host that writes alerts to the log.
//!
//! Used by the reminder daemon when no desktop surface is wired in, and
//! handy for watching what the scheduler would have shown.

use crate::alert::{Alert, AlertId};
use crate::error::PlatformError;
use crate::permission::PermissionStatus;
use crate::sink::{ActivationCallback, NotificationPlatform};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, info};

/// Renders alerts as `info` log events.
pub struct ConsolePlatform {
    permission: RwLock<PermissionStatus>,
    grant_on_prompt: bool,
    next_id: AtomicU64,
    visible: Mutex<HashMap<AlertId, ActivationCallback>>,
}

impl ConsolePlatform {
    /// Creates a console host reporting the given permission.
    ///
    /// When the permission is [`PermissionStatus::NotAsked`], a prompt
    /// grants it.
    #[must_use]
    pub fn new(permission: PermissionStatus) -> Self {
        Self {
            permission: RwLock::new(permission),
            grant_on_prompt: true,
            next_id: AtomicU64::new(1),
            visible: Mutex::new(HashMap::new()),
        }
    }

    /// Makes a prompt deny permission instead of granting it.
    #[must_use]
    pub fn denying_prompts(mut self) -> Self {
        self.grant_on_prompt = false;
        self
    }

    /// Returns the number of alerts still on screen.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Simulates the user clicking an alert.
    ///
    /// Returns false if the alert is no longer visible.
    pub fn activate(&self, id: AlertId) -> bool {
        let callback = self
            .visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match callback {
            Some(callback) => {
                callback(id);
                true
            }
            None => false,
        }
    }
}

impl Default for ConsolePlatform {
    fn default() -> Self {
        Self::new(PermissionStatus::NotAsked)
    }
}

#[async_trait]
impl NotificationPlatform for ConsolePlatform {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> PermissionStatus {
        *self
            .permission
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn prompt(&self) -> Result<PermissionStatus, PlatformError> {
        let mut permission = self
            .permission
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if *permission == PermissionStatus::NotAsked {
            *permission = if self.grant_on_prompt {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            };
        }
        Ok(*permission)
    }

    fn present(
        &self,
        alert: &Alert,
        on_activate: ActivationCallback,
    ) -> Result<AlertId, PlatformError> {
        let id = AlertId(self.next_id.fetch_add(1, Ordering::Relaxed));
        info!(
            alert = %id,
            tag = %alert.tag,
            priority = ?alert.priority,
            title = %alert.title,
            body = alert.body.as_deref().unwrap_or_default(),
            "Notification"
        );
        self.visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, on_activate);
        Ok(id)
    }

    fn dismiss(&self, id: AlertId) {
        let removed = self
            .visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            debug!(alert = %id, "Notification dismissed");
        }
    }

    fn focus_host(&self) {
        info!("Bringing habitual to the foreground");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{NotificationSink, PlatformSink};
    use std::sync::Arc;

    #[tokio::test]
    async fn prompt_grants_by_default() {
        let platform = ConsolePlatform::default();
        assert_eq!(platform.prompt().await.expect("prompt"), PermissionStatus::Granted);
    }

    #[tokio::test]
    async fn prompt_can_deny() {
        let platform = ConsolePlatform::default().denying_prompts();
        assert_eq!(platform.prompt().await.expect("prompt"), PermissionStatus::Denied);
    }

    #[tokio::test]
    async fn prompt_does_not_change_an_answered_permission() {
        let platform = ConsolePlatform::new(PermissionStatus::Denied);
        assert_eq!(platform.prompt().await.expect("prompt"), PermissionStatus::Denied);
    }

    #[tokio::test]
    async fn activation_through_sink_dismisses() {
        let platform = Arc::new(ConsolePlatform::new(PermissionStatus::Granted));
        let sink = PlatformSink::from_arc(Arc::clone(&platform));

        let _handle = sink.show(Alert::new("t", "Floss")).expect("shown");
        assert_eq!(platform.visible_count(), 1);

        assert!(platform.activate(AlertId(1)));
        assert_eq!(platform.visible_count(), 0);
        assert!(!platform.activate(AlertId(1)));
    }
}
