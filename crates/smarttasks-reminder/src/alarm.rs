//! Boundary to the single-shot wake-up alarm facility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smarttasks_core::TaskId;
use thiserror::Error;

use crate::types::ReminderConfig;

/// Payload handed to the alarm facility when arming, and handed back
/// unchanged when the alarm fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub task_id: TaskId,
    pub title: String,
    pub trigger_time: DateTime<Utc>,
}

impl From<&ReminderConfig> for AlarmRecord {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            task_id: config.task_id,
            title: config.title.clone(),
            trigger_time: config.trigger_time,
        }
    }
}

/// Why the alarm facility refused to arm.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlarmError {
    /// Exact alarms are not permitted (e.g. the permission was revoked).
    #[error("alarm permission denied: {0}")]
    PermissionDenied(String),

    /// The facility cannot deliver alarms in the current environment.
    #[error("alarms unsupported: {0}")]
    Unsupported(String),
}

/// A facility holding at most one engine-owned alarm.
///
/// Implementations must fire even when the host is idle and must deliver the
/// exact [`AlarmRecord`] they were armed with. Calls may block briefly; the
/// scheduler makes them while holding its lock.
pub trait AlarmPort: Send + Sync {
    /// Arm (or re-arm) the engine's alarm for `alarm`.
    fn arm(&self, alarm: &AlarmRecord) -> Result<(), AlarmError>;

    /// Cancel the alarm armed for `task_id`. No-op if it is not armed.
    fn disarm(&self, task_id: TaskId);
}
