use chrono::{DateTime, Utc};
use smarttasks_core::TaskId;
use thiserror::Error;

/// Errors surfaced to callers of the reminder engine.
///
/// Alarm facility failures are deliberately absent: they are absorbed by the
/// scheduler and reported through [`crate::SchedulerStatus`].
#[derive(Debug, Error)]
pub enum ReminderError {
    /// The trigger time is not strictly after the current time.
    #[error("Invalid trigger time for task {task_id}: {trigger_time} is not after {now}")]
    InvalidTriggerTime {
        task_id: TaskId,
        trigger_time: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// The reminder data itself is unusable (empty title, unrepresentable time).
    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),

    /// A fired alarm carried a payload that cannot belong to this engine.
    #[error("Invalid alarm payload: {0}")]
    InvalidAlarmPayload(String),
}

pub type Result<T> = std::result::Result<T, ReminderError>;
