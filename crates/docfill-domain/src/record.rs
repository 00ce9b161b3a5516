//! Task records - the persisted lifecycle of one extraction task
//!
//! A task is created `processing` and moves exactly once to `complete` or
//! `error`. The status is a single tagged value so that a record can never
//! hold both fields and an error message.

use crate::{Field, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Why a task ended in the `error` state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The model's output could not be parsed into fields
    MalformedResponse,

    /// The model call itself failed (transport, quota, non-2xx)
    AiCallFailure,
}

impl FailureKind {
    /// Get the failure kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::AiCallFailure => "ai_call_failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a task, tagged by `status` when serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    /// The model call is in flight
    Processing,

    /// Extraction finished; fields are enriched
    Complete {
        /// Enriched fields in model order
        fields: Vec<Field>,
    },

    /// Extraction failed
    Error {
        /// Failure classification
        kind: FailureKind,
        /// Human readable message
        message: String,
    },
}

impl TaskStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Processing => "processing",
            TaskStatus::Complete { .. } => "complete",
            TaskStatus::Error { .. } => "error",
        }
    }

    /// Whether no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Processing)
    }
}

/// Attempted transition out of a terminal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    /// Task the transition was attempted on
    pub task_id: TaskId,
    /// Status the task is already in
    pub from: &'static str,
    /// Status that was requested
    pub to: &'static str,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} cannot move from {} to {}",
            self.task_id, self.from, self.to
        )
    }
}

impl std::error::Error for TransitionError {}

/// The single status record stored per task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Task identifier
    pub task_id: TaskId,

    /// Current status, flattened so the JSON carries a top-level `status`
    #[serde(flatten)]
    pub status: TaskStatus,

    /// Unix seconds of the last transition
    pub updated_at: u64,
}

impl TaskRecord {
    /// A fresh record in the `processing` state
    pub fn processing(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: TaskStatus::Processing,
            updated_at: now_secs(),
        }
    }

    /// Transition to `complete` with the enriched fields
    pub fn complete(self, fields: Vec<Field>) -> Result<Self, TransitionError> {
        self.transition(TaskStatus::Complete { fields })
    }

    /// Transition to `error`
    pub fn fail(
        self,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Result<Self, TransitionError> {
        self.transition(TaskStatus::Error {
            kind,
            message: message.into(),
        })
    }

    fn transition(self, next: TaskStatus) -> Result<Self, TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError {
                task_id: self.task_id,
                from: self.status.as_str(),
                to: next.as_str(),
            });
        }
        Ok(Self {
            task_id: self.task_id,
            status: next,
            updated_at: now_secs(),
        })
    }

    /// Fields, present only when complete
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.status {
            TaskStatus::Complete { fields } => Some(fields),
            _ => None,
        }
    }

    /// Error message, present only on error
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            TaskStatus::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
