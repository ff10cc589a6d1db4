use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smarttasks_core::{Task, TaskId};

use crate::error::{ReminderError, Result};

/// Identity and trigger metadata for one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub task_id: TaskId,
    /// Display text captured when the reminder was scheduled.
    pub title: String,
    /// Absolute instant the reminder should fire.
    pub trigger_time: DateTime<Utc>,
    /// Fire again 24 hours later after each fire.
    pub repeat: bool,
}

impl ReminderConfig {
    pub fn new(
        task_id: TaskId,
        title: impl Into<String>,
        trigger_time: DateTime<Utc>,
        repeat: bool,
    ) -> Self {
        Self {
            task_id,
            title: title.into(),
            trigger_time,
            repeat,
        }
    }

    /// Build a one-shot reminder for a task's start time.
    ///
    /// Fails when the task has no usable start time or an empty title.
    pub fn from_task(task: &Task) -> Result<Self> {
        let trigger_time = task.start_at().ok_or_else(|| {
            ReminderError::InvalidReminder(format!(
                "task {} has no valid start time ({})",
                task.id, task.start_time
            ))
        })?;
        let config = Self::new(task.id, task.title.clone(), trigger_time, false);
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ReminderError::InvalidReminder(format!(
                "task {} has an empty title",
                self.task_id
            )));
        }
        Ok(())
    }

    /// The same reminder moved to a new trigger time.
    pub(crate) fn rescheduled(&self, trigger_time: DateTime<Utc>) -> Self {
        Self {
            trigger_time,
            ..self.clone()
        }
    }
}

/// The alarm currently held by the alarm facility on behalf of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedAlarm {
    pub task_id: TaskId,
    pub trigger_time: DateTime<Utc>,
}

impl ArmedAlarm {
    pub(crate) fn targets(&self, config: &ReminderConfig) -> bool {
        self.task_id == config.task_id && self.trigger_time == config.trigger_time
    }
}

/// Observable health of the alarm side of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchedulerStatus {
    Healthy,
    /// The alarm facility refused to arm the reminder for `task_id`.
    /// Retried on the next mutating call or reconciliation tick.
    Degraded { task_id: TaskId, reason: String },
}

impl SchedulerStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SchedulerStatus::Degraded { .. })
    }
}

/// What `on_fired` did with a fire callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// The due reminder was removed; `successor` is set for repeating reminders.
    Consumed {
        config: ReminderConfig,
        successor: Option<ReminderConfig>,
    },
    /// Nothing was pending for the task (deleted, cancelled, or already reconciled).
    NotPending,
    /// The pending reminder is not due yet, so the callback belongs to an
    /// alarm that was superseded. The pending entry is kept.
    NotDue(ReminderConfig),
}

impl FireOutcome {
    pub fn consumed(&self) -> Option<&ReminderConfig> {
        match self {
            FireOutcome::Consumed { config, .. } => Some(config),
            _ => None,
        }
    }
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Overdue reminders that were delivered as implicit fires and discarded.
    pub fired: Vec<ReminderConfig>,
    /// Successors scheduled for repeating reminders among `fired`.
    pub successors: Vec<ReminderConfig>,
}
