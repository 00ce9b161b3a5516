use crate::StoreError;
use docfill_domain::traits::TaskStore;
use docfill_domain::{TaskId, TaskRecord};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory implementation of TaskStore
///
/// Records live only as long as the process. Useful for tests and for
/// running the server without a data directory.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    records: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl MemoryTaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks with a record
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether no task has a record yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskStore for MemoryTaskStore {
    type Error = StoreError;

    fn put(&self, record: &TaskRecord) -> Result<(), Self::Error> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        records.insert(record.task_id, record.clone());
        Ok(())
    }

    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, Self::Error> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(records.get(&id).cloned())
    }
}
