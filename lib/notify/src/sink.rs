//! The delivery boundary between the scheduler and the host platform.

use crate::alert::{Alert, AlertId};
use crate::error::{NotifyError, PlatformError};
use crate::handle::DeliveryHandle;
use crate::permission::PermissionStatus;
use async_trait::async_trait;
use rootcause::prelude::Report;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, warn};

/// How long a shown alert stays up before it is dismissed automatically.
pub const DEFAULT_AUTO_DISMISS: Duration = Duration::from_secs(10);

/// Invoked by the platform when the user activates (clicks) an alert.
pub type ActivationCallback = Box<dyn Fn(AlertId) + Send + Sync>;

/// Where notifications are delivered.
///
/// The scheduler only ever talks to this trait, so it can be tested
/// without a real notification surface.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Returns whether the host can show notifications at all.
    fn is_supported(&self) -> bool;

    /// Returns the current permission status. Never prompts.
    fn permission_status(&self) -> PermissionStatus;

    /// Asks the user for permission if they have not been asked yet.
    ///
    /// Already granted or denied permission is returned as is, without
    /// touching the platform.
    async fn request_permission(&self) -> PermissionStatus;

    /// Shows an alert.
    ///
    /// Returns an inert handle when notifications are unsupported or not
    /// permitted.
    ///
    /// # Errors
    ///
    /// Returns an error only when the platform fails while showing.
    fn show(&self, alert: Alert) -> Result<DeliveryHandle, Report<NotifyError>>;
}

/// Raw host notification capability.
#[async_trait]
pub trait NotificationPlatform: Send + Sync + 'static {
    /// Returns whether the host has a notification surface.
    fn is_supported(&self) -> bool;

    /// Returns the permission the host currently reports.
    fn permission(&self) -> PermissionStatus;

    /// Shows the host's permission prompt and returns the answer.
    async fn prompt(&self) -> Result<PermissionStatus, PlatformError>;

    /// Renders an alert. `on_activate` must be called when the user
    /// activates it.
    fn present(&self, alert: &Alert, on_activate: ActivationCallback)
    -> Result<AlertId, PlatformError>;

    /// Removes an alert if it is still visible.
    fn dismiss(&self, id: AlertId);

    /// Brings the host application to the foreground.
    fn focus_host(&self);
}

/// A [`NotificationSink`] over a [`NotificationPlatform`].
///
/// Adds permission gating, an auto-dismiss timeout and activation
/// handling (focus the host, then dismiss) to whatever the platform
/// renders.
pub struct PlatformSink<P> {
    platform: Arc<P>,
    auto_dismiss: Duration,
}

impl<P: NotificationPlatform> PlatformSink<P> {
    /// Creates a sink over the given platform.
    #[must_use]
    pub fn new(platform: P) -> Self {
        Self::from_arc(Arc::new(platform))
    }

    /// Creates a sink over a shared platform.
    #[must_use]
    pub fn from_arc(platform: Arc<P>) -> Self {
        Self {
            platform,
            auto_dismiss: DEFAULT_AUTO_DISMISS,
        }
    }

    /// Overrides the auto-dismiss timeout.
    #[must_use]
    pub fn with_auto_dismiss(mut self, auto_dismiss: Duration) -> Self {
        self.auto_dismiss = auto_dismiss;
        self
    }

    /// Returns the underlying platform.
    #[must_use]
    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    fn arm_auto_dismiss(&self, id: AlertId) -> Option<tokio::task::AbortHandle> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(alert = %id, "No runtime available, alert will not auto-dismiss");
            return None;
        };

        let platform = Arc::downgrade(&self.platform);
        let delay = self.auto_dismiss;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(platform) = platform.upgrade() {
                debug!(alert = %id, "Auto-dismissing alert");
                platform.dismiss(id);
            }
        });
        Some(task.abort_handle())
    }
}

fn activation_callback<P: NotificationPlatform>(platform: Weak<P>) -> ActivationCallback {
    Box::new(move |id| {
        if let Some(platform) = platform.upgrade() {
            platform.focus_host();
            platform.dismiss(id);
        }
    })
}

#[async_trait]
impl<P: NotificationPlatform> NotificationSink for PlatformSink<P> {
    fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    fn permission_status(&self) -> PermissionStatus {
        if !self.platform.is_supported() {
            return PermissionStatus::Denied;
        }
        self.platform.permission()
    }

    async fn request_permission(&self) -> PermissionStatus {
        let current = self.permission_status();
        if current != PermissionStatus::NotAsked {
            return current;
        }

        match self.platform.prompt().await {
            Ok(status) => {
                debug!(%status, "Notification permission answered");
                status
            }
            Err(e) => {
                warn!(error = %e, "Notification permission prompt failed");
                self.platform.permission()
            }
        }
    }

    fn show(&self, alert: Alert) -> Result<DeliveryHandle, Report<NotifyError>> {
        if !self.platform.is_supported() {
            debug!(tag = %alert.tag, "Notifications unsupported, skipping alert");
            return Ok(DeliveryHandle::inert());
        }
        if !self.platform.permission().is_granted() {
            debug!(tag = %alert.tag, "Notification permission not granted, skipping alert");
            return Ok(DeliveryHandle::inert());
        }

        let on_activate = activation_callback(Arc::downgrade(&self.platform));
        let id = self
            .platform
            .present(&alert, on_activate)
            .map_err(|e| NotifyError::ShowFailed {
                tag: alert.tag.clone(),
                reason: e.to_string(),
            })?;

        let timeout = self.arm_auto_dismiss(id);
        let platform = Arc::downgrade(&self.platform);
        Ok(DeliveryHandle::new(move || {
            if let Some(timeout) = timeout {
                timeout.abort();
            }
            if let Some(platform) = platform.upgrade() {
                platform.dismiss(id);
            }
        }))
    }
}
