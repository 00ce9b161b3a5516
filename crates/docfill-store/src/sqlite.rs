use crate::StoreError;
use docfill_domain::traits::TaskStore;
use docfill_domain::{TaskId, TaskRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS task_records (
    task_id    TEXT PRIMARY KEY NOT NULL,
    status     TEXT NOT NULL,
    record     TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQLite-based implementation of TaskStore
///
/// One row per task. `put` is a single upsert, so the row moves from one
/// status to the next in one statement.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe; the connection is guarded by a
/// mutex so the store can be shared between concurrent tasks.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Open a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Count tasks currently in the given status
    pub fn count_by_status(&self, status: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM task_records WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl TaskStore for SqliteTaskStore {
    type Error = StoreError;

    fn put(&self, record: &TaskRecord) -> Result<(), Self::Error> {
        let json = serde_json::to_string(record)?;
        let conn = self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;

        conn.execute(
            "INSERT INTO task_records (task_id, status, record, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(task_id) DO UPDATE SET
             status = excluded.status, record = excluded.record, updated_at = excluded.updated_at",
            params![
                record.task_id.to_string(),
                record.status.as_str(),
                json,
                record.updated_at as i64,
            ],
        )?;

        Ok(())
    }

    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, Self::Error> {
        let conn = self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;

        let json: Option<String> = conn
            .query_row(
                "SELECT record FROM task_records WHERE task_id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
