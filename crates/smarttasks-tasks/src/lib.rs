//! `smarttasks-tasks`: SQLite-backed task store that announces every
//! committed mutation on a typed [`bus::TaskEventBus`].

pub mod bus;
pub mod db;
pub mod error;
pub mod manager;
pub mod types;

pub use bus::TaskEventBus;
pub use error::{Result, TaskError};
pub use manager::TaskManager;
pub use types::TaskDraft;
