//! Daemon configuration.
//!
//! Loaded via the `config` crate from `HABITUAL_*` environment variables.
//! Nested keys use `__`, e.g. `HABITUAL_GROUPING__MIN_COUNT=3`.

use habitual_notify::PermissionStatus;
use habitual_scheduler::GroupingConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

const ENV_PREFIX: &str = "HABITUAL";

/// Reminder daemon configuration.
#[derive(Debug, Deserialize)]
pub struct ReminderdConfig {
    /// JSON file holding an array of habits.
    pub habits_file: PathBuf,

    /// JSON file holding an array of vacation periods.
    #[serde(default)]
    pub vacations_file: Option<PathBuf>,

    /// How simultaneous reminders are merged.
    #[serde(default)]
    pub grouping: GroupingConfig,

    /// Notification host settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Notification host settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Seconds a shown alert stays up before it is dismissed.
    #[serde(default = "default_auto_dismiss_seconds")]
    pub auto_dismiss_seconds: u64,

    /// Permission the host starts with. `not_asked` is granted on prompt.
    #[serde(default)]
    pub permission: PermissionStatus,
}

fn default_auto_dismiss_seconds() -> u64 {
    10
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_seconds: default_auto_dismiss_seconds(),
            permission: PermissionStatus::default(),
        }
    }
}

impl NotificationsConfig {
    #[must_use]
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_secs(self.auto_dismiss_seconds)
    }
}

impl ReminderdConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(None)
    }

    /// Loads configuration from the given variables instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_vars<K, V>(
        vars: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, config::ConfigError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> Result<Self, config::ConfigError> {
        let mut config: Self = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars.map(|v| v.into_iter().collect())),
            )
            .build()?
            .try_deserialize()?;
        config.grouping.min_count = config.grouping.min_count.max(1);
        Ok(config)
    }
}
