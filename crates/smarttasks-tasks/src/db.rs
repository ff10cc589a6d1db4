use rusqlite::Connection;

use crate::error::Result;

/// Initialise the task schema in `conn`.
///
/// Creates the `tasks` table (idempotent) and an index on `start_time` so the
/// startup re-seed scan stays cheap.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT    NOT NULL,
            description TEXT    NOT NULL DEFAULT '',
            start_time  INTEGER NOT NULL DEFAULT 0,   -- epoch millis, 0 = none
            completed   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT    NOT NULL,
            updated_at  TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_tasks_start_time ON tasks (start_time);
        ",
    )?;
    Ok(())
}
