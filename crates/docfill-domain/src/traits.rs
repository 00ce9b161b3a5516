//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{TaskId, TaskRecord};
use std::future::Future;

/// Key-value store of task status records
///
/// Implemented by the infrastructure layer (docfill-store). Each task only
/// ever writes under its own id, so implementations need no locking beyond
/// making a single key's write atomic.
pub trait TaskStore {
    /// Error type for store operations
    type Error;

    /// Write the record under its task id, replacing any previous record
    fn put(&self, record: &TaskRecord) -> Result<(), Self::Error>;

    /// Read the record for a task id, if one has been written
    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, Self::Error>;
}

/// Trait for generative model operations
///
/// Implemented by the infrastructure layer (docfill-llm). The call is the
/// only suspension point of an extraction task.
pub trait LlmProvider {
    /// Error type for model calls
    type Error;

    /// Send a prompt and return the raw response text
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Short provider/model label for logs and health output
    fn model_name(&self) -> &str;
}
