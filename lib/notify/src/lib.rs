//! Notification delivery for habitual.
//!
//! This crate provides:
//!
//! - **NotificationSink**: the permission-gated delivery boundary the
//!   reminder scheduler talks to
//! - **NotificationPlatform**: the host capability a sink is built over,
//!   swappable for tests
//! - **PlatformSink**: a sink that adds auto-dismiss and activation wiring
//!   on top of any platform
//! - **ConsolePlatform**: a host that renders alerts through `tracing`

pub mod alert;
pub mod console;
pub mod error;
pub mod handle;
pub mod permission;
pub mod sink;

pub use alert::{Alert, AlertId, Priority};
pub use console::ConsolePlatform;
pub use error::{NotifyError, PlatformError};
pub use handle::DeliveryHandle;
pub use permission::PermissionStatus;
pub use sink::{
    ActivationCallback, DEFAULT_AUTO_DISMISS, NotificationPlatform, NotificationSink, PlatformSink,
};
