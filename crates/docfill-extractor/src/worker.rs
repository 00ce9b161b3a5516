//! Background submission of extraction tasks

use crate::error::ExtractorError;
use crate::task::ExtractionTask;
use docfill_domain::traits::{LlmProvider, TaskStore};
use docfill_domain::{TaskId, TaskRecord};
use tokio::task::JoinHandle;

/// A submitted task: its id is usable before the work finishes
#[derive(Debug)]
pub struct TaskHandle {
    /// Identifier to poll the store with
    pub task_id: TaskId,
    /// Completes with the terminal record once processing ends
    pub join: JoinHandle<Result<TaskRecord, ExtractorError>>,
}

/// Spawns extraction tasks onto the tokio runtime
///
/// # Examples
///
/// ```no_run
/// use docfill_extractor::{ExtractionTask, ExtractionWorker, ExtractorConfig};
/// use docfill_llm::MockProvider;
/// use docfill_store::MemoryTaskStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let task = ExtractionTask::new(
///     Arc::new(MockProvider::default()),
///     Arc::new(MemoryTaskStore::new()),
///     ExtractorConfig::default(),
/// )?;
/// let worker = ExtractionWorker::new(task);
///
/// let handle = worker.submit(b"Dear John Smith,".to_vec());
/// println!("status: {}", worker.status(handle.task_id)?.status.as_str());
/// # Ok(())
/// # }
/// ```
pub struct ExtractionWorker<L, S> {
    task: ExtractionTask<L, S>,
}

impl<L, S> Clone for ExtractionWorker<L, S> {
    fn clone(&self) -> Self {
        Self {
            task: self.task.clone(),
        }
    }
}

impl<L, S> ExtractionWorker<L, S>
where
    L: LlmProvider + Send + Sync + 'static,
    S: TaskStore + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    S::Error: std::fmt::Display,
{
    /// Wrap a task runner
    pub fn new(task: ExtractionTask<L, S>) -> Self {
        Self { task }
    }

    /// Start processing a document and return without waiting
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, document: Vec<u8>) -> TaskHandle {
        let task_id = TaskId::new();
        let task = self.task.clone();

        tracing::debug!(%task_id, bytes = document.len(), "Submitting extraction task");
        let join = tokio::spawn(async move { task.run(task_id, &document).await });

        TaskHandle { task_id, join }
    }

    /// Current record for a task
    ///
    /// A task with no record yet has been accepted but not started, and is
    /// reported as `processing`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Store`] if the store cannot be read.
    pub fn status(&self, task_id: TaskId) -> Result<TaskRecord, ExtractorError> {
        let record = self
            .task
            .store()
            .get(task_id)
            .map_err(|e| ExtractorError::Store(e.to_string()))?;

        Ok(record.unwrap_or_else(|| TaskRecord::processing(task_id)))
    }
}
