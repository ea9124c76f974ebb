//! Cancellation handles for delivered alerts.

use std::fmt;

/// Returned by every `show` call.
///
/// Cancelling stops the alert's auto-dismiss timer and removes the alert
/// if it is still visible. An inert handle does nothing; it is what a sink
/// returns when it was not allowed to show anything. Dropping a handle
/// without cancelling leaves the alert to expire on its own.
pub struct DeliveryHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl DeliveryHandle {
    /// Creates a handle that runs `cancel` when cancelled.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Creates a handle with nothing to cancel.
    #[must_use]
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    /// Returns true if cancelling this handle has no effect.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.cancel.is_none()
    }

    /// Cancels the delivery.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for DeliveryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryHandle")
            .field("inert", &self.is_inert())
            .finish()
    }
}
