use smarttasks_core::TaskId;
use thiserror::Error;

/// Errors that can occur during task store operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// No task with the given ID exists in the store.
    #[error("task not found: {id}")]
    NotFound { id: TaskId },

    /// The submitted task data is unusable.
    #[error("invalid task: {0}")]
    Invalid(String),

    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
