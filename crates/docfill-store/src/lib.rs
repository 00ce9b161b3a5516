//! Docfill Storage Layer
//!
//! Implements the `TaskStore` trait: a key-value mapping from task id to the
//! task's single status record.
//!
//! # Backends
//!
//! - [`MemoryTaskStore`]: in-process map, for tests and single-process use
//! - [`FileTaskStore`]: one JSON status file per task, replaced atomically
//! - [`SqliteTaskStore`]: one row per task, replaced with an upsert
//!
//! Every backend writes a record under one key in one step, so a reader sees
//! either the previous record or the new one and never a mix of the two.
//!
//! # Examples
//!
//! ```
//! use docfill_domain::{TaskId, TaskRecord};
//! use docfill_domain::traits::TaskStore;
//! use docfill_store::MemoryTaskStore;
//!
//! let store = MemoryTaskStore::new();
//! let record = TaskRecord::processing(TaskId::new());
//! store.put(&record).unwrap();
//! assert_eq!(store.get(record.task_id).unwrap(), Some(record));
//! ```

#![warn(missing_docs)]

mod file;
mod memory;
mod sqlite;

pub use file::FileTaskStore;
pub use memory::MemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use docfill_domain::traits::TaskStore;
use docfill_domain::{TaskId, TaskRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("Invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),

    /// A lock guarding the backend was poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

/// A store chosen at runtime from configuration
pub enum AnyTaskStore {
    /// In-memory map
    Memory(MemoryTaskStore),
    /// JSON file per task
    File(FileTaskStore),
    /// SQLite table
    Sqlite(SqliteTaskStore),
}

impl TaskStore for AnyTaskStore {
    type Error = StoreError;

    fn put(&self, record: &TaskRecord) -> Result<(), Self::Error> {
        match self {
            AnyTaskStore::Memory(s) => s.put(record),
            AnyTaskStore::File(s) => s.put(record),
            AnyTaskStore::Sqlite(s) => s.put(record),
        }
    }

    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, Self::Error> {
        match self {
            AnyTaskStore::Memory(s) => s.get(id),
            AnyTaskStore::File(s) => s.get(id),
            AnyTaskStore::Sqlite(s) => s.get(id),
        }
    }
}
