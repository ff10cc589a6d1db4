use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Stable row identity of a task (SQLite `INTEGER PRIMARY KEY`).
pub type TaskId = i64;

/// A task as seen by everything outside the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Epoch milliseconds; `0` means the task has no start time.
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub completed: bool,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    /// ISO-8601 timestamp of the last mutation.
    pub updated_at: String,
}

impl Task {
    /// The start time as an absolute instant, or `None` when unset or out of range.
    pub fn start_at(&self) -> Option<DateTime<Utc>> {
        if self.start_time <= 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.start_time).single()
    }

    /// True when this task should carry a reminder at all.
    pub fn wants_reminder(&self) -> bool {
        !self.completed && self.start_time > 0
    }
}

/// Discriminant used to subscribe to a subset of task events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    Added,
    Updated,
    Deleted,
    CompletionChanged,
}

/// A task lifecycle notification published by the task store after the
/// mutation has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskEvent {
    Added { task: Task },
    Updated { task: Task },
    Deleted { task_id: TaskId },
    /// The task's `completed` flag was flipped; `task` carries the new state.
    CompletionChanged { task: Task },
}

impl TaskEvent {
    pub fn kind(&self) -> TaskEventKind {
        match self {
            TaskEvent::Added { .. } => TaskEventKind::Added,
            TaskEvent::Updated { .. } => TaskEventKind::Updated,
            TaskEvent::Deleted { .. } => TaskEventKind::Deleted,
            TaskEvent::CompletionChanged { .. } => TaskEventKind::CompletionChanged,
        }
    }

    pub fn task_id(&self) -> TaskId {
        match self {
            TaskEvent::Added { task }
            | TaskEvent::Updated { task }
            | TaskEvent::CompletionChanged { task } => task.id,
            TaskEvent::Deleted { task_id } => *task_id,
        }
    }
}
