//! Error types for the Extractor

use docfill_domain::FailureKind;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The model's output is not a JSON array of field objects
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The model call failed (transport, quota, model error)
    #[error("AI call failed: {0}")]
    AiCall(String),

    /// Task store error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Classification persisted on the task record, for errors that end a task
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExtractorError::MalformedResponse(_) => Some(FailureKind::MalformedResponse),
            ExtractorError::AiCall(_) => Some(FailureKind::AiCallFailure),
            ExtractorError::Store(_) | ExtractorError::Config(_) => None,
        }
    }
}
