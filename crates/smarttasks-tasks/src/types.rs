use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};

/// User-editable task fields, as submitted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Epoch milliseconds; `0` (or omitted) means no start time.
    #[serde(default)]
    pub start_time: i64,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, start_time: i64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start_time,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TaskError::Invalid("title cannot be empty".to_string()));
        }
        if self.start_time < 0 {
            return Err(TaskError::Invalid(format!(
                "start_time must be epoch millis or 0, got {}",
                self.start_time
            )));
        }
        Ok(())
    }
}
