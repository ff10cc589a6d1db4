use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18790;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Reconciliation backstop cadence.
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 60;
/// Capacity of the queue carrying fired alarms to the fired handler.
pub const DEFAULT_FIRED_QUEUE_CAPACITY: usize = 256;

/// Top-level config (smarttasks.toml + SMARTTASKS_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmartTasksConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reminder: ReminderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Reminder engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderSettings {
    /// Seconds between reconciliation ticks. Values below 1 are clamped to 1.
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
    /// Bound of the fired-alarm queue between the alarm and the fired handler.
    #[serde(default = "default_fired_queue_capacity")]
    pub fired_queue_capacity: usize,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
            fired_queue_capacity: DEFAULT_FIRED_QUEUE_CAPACITY,
        }
    }
}

impl ReminderSettings {
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs.max(1))
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_reconcile_interval_secs() -> u64 {
    DEFAULT_RECONCILE_INTERVAL_SECS
}
fn default_fired_queue_capacity() -> usize {
    DEFAULT_FIRED_QUEUE_CAPACITY
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.smarttasks/tasks.db", home)
}

impl SmartTasksConfig {
    /// Load config from a TOML file with SMARTTASKS_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `SMARTTASKS_REMINDER__RECONCILE_INTERVAL_SECS=30`.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.smarttasks/smarttasks.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("SMARTTASKS_").split("__")),
        )
    }

    /// Extract a config from an already assembled figment.
    pub fn from_figment(figment: Figment) -> crate::error::Result<Self> {
        figment
            .extract()
            .map_err(|e| crate::error::SmartTasksError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.smarttasks/smarttasks.toml", home)
}
