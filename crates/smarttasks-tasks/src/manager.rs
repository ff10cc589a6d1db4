use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension, Row};
use smarttasks_core::{Task, TaskEvent, TaskId};
use tracing::{info, instrument};

use crate::{
    bus::TaskEventBus,
    error::{Result, TaskError},
    types::TaskDraft,
};

const TASK_COLUMNS: &str =
    "id, title, description, start_time, completed, created_at, updated_at";

/// Thread-safe task store.
///
/// Wraps a single SQLite connection in a `Mutex`. Every committed mutation is
/// published on the [`TaskEventBus`] while the connection lock is still held,
/// so subscribers see events in commit order.
pub struct TaskManager {
    db: Mutex<Connection>,
    bus: Arc<TaskEventBus>,
}

impl TaskManager {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection, bus: Arc<TaskEventBus>) -> Self {
        Self {
            db: Mutex::new(conn),
            bus,
        }
    }

    pub fn bus(&self) -> &Arc<TaskEventBus> {
        &self.bus
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub fn create(&self, draft: &TaskDraft) -> Result<Task> {
        draft.validate()?;
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.lock();
        db.execute(
            "INSERT INTO tasks (title, description, start_time, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            params![draft.title.trim(), draft.description, draft.start_time, now],
        )?;
        let task = fetch(&db, db.last_insert_rowid())?;
        info!(task_id = task.id, "task created");
        self.bus.publish(TaskEvent::Added { task: task.clone() });
        Ok(task)
    }

    #[instrument(skip(self, draft))]
    pub fn update(&self, id: TaskId, draft: &TaskDraft) -> Result<Task> {
        draft.validate()?;
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.lock();
        let n = db.execute(
            "UPDATE tasks SET title = ?1, description = ?2, start_time = ?3, updated_at = ?4
             WHERE id = ?5",
            params![draft.title.trim(), draft.description, draft.start_time, now, id],
        )?;
        if n == 0 {
            return Err(TaskError::NotFound { id });
        }
        let task = fetch(&db, id)?;
        self.bus.publish(TaskEvent::Updated { task: task.clone() });
        Ok(task)
    }

    /// Mark a task done (or open again). Publishes only when the flag changes.
    #[instrument(skip(self))]
    pub fn set_completed(&self, id: TaskId, completed: bool) -> Result<Task> {
        let db = self.lock();
        let current = fetch(&db, id)?;
        if current.completed == completed {
            return Ok(current);
        }
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "UPDATE tasks SET completed = ?1, updated_at = ?2 WHERE id = ?3",
            params![completed, now, id],
        )?;
        let task = fetch(&db, id)?;
        self.bus
            .publish(TaskEvent::CompletionChanged { task: task.clone() });
        Ok(task)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: TaskId) -> Result<()> {
        let db = self.lock();
        let n = db.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(TaskError::NotFound { id });
        }
        info!(task_id = id, "task deleted");
        self.bus.publish(TaskEvent::Deleted { task_id: id });
        Ok(())
    }

    pub fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let db = self.lock();
        let task = db
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// All tasks, oldest first.
    pub fn list(&self) -> Result<Vec<Task>> {
        let db = self.lock();
        let mut stmt = db.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn fetch(db: &Connection, id: TaskId) -> Result<Task> {
    db.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id],
        row_to_task,
    )
    .optional()?
    .ok_or(TaskError::NotFound { id })
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start_time: row.get(3)?,
        completed: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
