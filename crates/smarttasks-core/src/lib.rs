//! Shared building blocks for the SmartTasks workspace: configuration,
//! the top-level error type, and the task/event vocabulary exchanged between
//! the task store and the reminder engine.

pub mod config;
pub mod error;
pub mod types;

pub use error::{Result, SmartTasksError};
pub use types::{Task, TaskEvent, TaskEventKind, TaskId};
