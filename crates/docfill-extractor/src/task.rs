//! One document's extraction lifecycle
//!
//! ```text
//! bytes → decode → [processing] → model call → parse → enrich → [complete]
//!                                      └──────────┴──────────────→ [error]
//! ```

use crate::config::ExtractorConfig;
use crate::enrich::FieldEnricher;
use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use docfill_domain::traits::{LlmProvider, TaskStore};
use docfill_domain::{FailureKind, Field, TaskId, TaskRecord};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Message stored on a task whose model output could not be parsed
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Failed to extract fields from document";

/// Runs extraction tasks against a model and records their status
///
/// Cloning is cheap: the provider and store are shared, so one value can be
/// handed to many concurrently running tasks.
pub struct ExtractionTask<L, S> {
    llm_provider: Arc<L>,
    store: Arc<S>,
    config: ExtractorConfig,
}

impl<L, S> Clone for ExtractionTask<L, S> {
    fn clone(&self) -> Self {
        Self {
            llm_provider: Arc::clone(&self.llm_provider),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<L, S> ExtractionTask<L, S>
where
    L: LlmProvider + Send + Sync + 'static,
    S: TaskStore + Send + Sync + 'static,
    L::Error: std::fmt::Display,
    S::Error: std::fmt::Display,
{
    /// Create a task runner
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if the configuration is invalid.
    pub fn new(
        llm_provider: Arc<L>,
        store: Arc<S>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            llm_provider,
            store,
            config,
        })
    }

    /// The shared status store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Process one document to a terminal record
    ///
    /// Writes `processing`, then exactly one terminal record under `task_id`.
    /// Both outcomes are written as one record under one key, so a success
    /// never leaves an error behind and vice versa.
    ///
    /// # Errors
    ///
    /// Only store failures are returned. Model and parse failures are
    /// recorded on the task and returned as an `error` record.
    pub async fn run(&self, task_id: TaskId, document: &[u8]) -> Result<TaskRecord, ExtractorError> {
        let text = String::from_utf8_lossy(document);

        let processing = TaskRecord::processing(task_id);
        self.put(&processing)?;
        info!(%task_id, bytes = document.len(), model = self.llm_provider.model_name(), "Extraction started");

        let terminal = match self.extract(task_id, &text).await {
            Ok(fields) => {
                info!(%task_id, fields = fields.len(), "Extraction complete");
                processing.complete(fields)
            }
            Err(e) => {
                warn!(%task_id, error = %e, "Extraction failed");
                let kind = e.failure_kind().unwrap_or(FailureKind::AiCallFailure);
                processing.fail(kind, failure_message(&e))
            }
        }
        .map_err(|e| ExtractorError::Store(e.to_string()))?;

        self.put(&terminal)?;
        Ok(terminal)
    }

    async fn extract(&self, task_id: TaskId, text: &str) -> Result<Vec<Field>, ExtractorError> {
        let prompt = PromptBuilder::new(text).build();
        debug!(%task_id, "Prompt length: {} chars", prompt.len());

        let response = self
            .llm_provider
            .generate(&prompt)
            .await
            .map_err(|e| ExtractorError::AiCall(e.to_string()))?;
        debug!(%task_id, "LLM response length: {} chars", response.len());

        let fields = parse_llm_response(&response).inspect_err(|e| {
            error!(%task_id, error = %e, raw_response = %response, "Failed to parse model response");
        })?;

        Ok(FieldEnricher::new(&self.config).enrich(text, fields))
    }

    fn put(&self, record: &TaskRecord) -> Result<(), ExtractorError> {
        self.store.put(record).map_err(|e| {
            error!(task_id = %record.task_id, status = record.status.as_str(), error = %e, "Failed to write task record");
            ExtractorError::Store(e.to_string())
        })
    }
}

fn failure_message(error: &ExtractorError) -> String {
    match error {
        ExtractorError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_domain::TaskStatus;
    use docfill_llm::MockProvider;
    use docfill_store::MemoryTaskStore;

    const INVOICE: &str = "Dear John Smith, your invoice #4521 is due on 5 March, 2024.";

    fn task(llm: MockProvider) -> ExtractionTask<MockProvider, MemoryTaskStore> {
        ExtractionTask::new(
            Arc::new(llm),
            Arc::new(MemoryTaskStore::new()),
            ExtractorConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_records_complete() {
        let task = task(MockProvider::new(
            r#"[{"fieldName":"Customer Name","currentValue":"John Smith","fieldType":"name"}]"#,
        ));
        let id = TaskId::new();

        let record = task.run(id, INVOICE.as_bytes()).await.unwrap();

        assert_eq!(record.status.as_str(), "complete");
        assert_eq!(task.store().get(id).unwrap(), Some(record.clone()));
        let fields = record.fields().unwrap();
        assert_eq!(fields[0].context_before, "Dear");
    }

    #[tokio::test]
    async fn test_ai_failure_records_error() {
        let task = task(MockProvider::failing("quota exceeded"));
        let id = TaskId::new();

        let record = task.run(id, INVOICE.as_bytes()).await.unwrap();

        match &record.status {
            TaskStatus::Error { kind, message } => {
                assert_eq!(*kind, FailureKind::AiCallFailure);
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert!(task.store().get(id).unwrap().unwrap().fields().is_none());
    }

    #[tokio::test]
    async fn test_prose_response_records_malformed() {
        let task = task(MockProvider::new("Sorry, I can't help with that document."));
        let record = task.run(TaskId::new(), INVOICE.as_bytes()).await.unwrap();

        assert_eq!(
            record.status,
            TaskStatus::Error {
                kind: FailureKind::MalformedResponse,
                message: MALFORMED_RESPONSE_MESSAGE.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decoded_lossily() {
        let task = task(MockProvider::new("[]"));
        let mut bytes = b"Dear ".to_vec();
        bytes.push(0xFF);

        let record = task.run(TaskId::new(), &bytes).await.unwrap();
        assert_eq!(record.fields(), Some(&[][..]));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ExtractorConfig {
            context_words: 0,
            ..Default::default()
        };
        let result = ExtractionTask::new(
            Arc::new(MockProvider::default()),
            Arc::new(MemoryTaskStore::new()),
            config,
        );
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }
}
