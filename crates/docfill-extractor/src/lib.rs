//! Docfill Extractor
//!
//! Finds the replaceable fields of a document with a generative model and
//! records each extraction as a task.
//!
//! # Overview
//!
//! An upload becomes an [`ExtractionTask`]. The task asks the model which
//! values in the document would change if the document were reused as a
//! template, parses the answer into [`Field`](docfill_domain::Field)s and
//! enriches every field with the words around its first occurrence and a
//! default set of validation rules.
//!
//! # Architecture
//!
//! ```text
//! bytes → PromptBuilder → LLM → parse_llm_response → FieldEnricher → TaskStore
//!                                                        │
//!                                              ContextWindowResolver
//! ```
//!
//! The status of every task lives in a [`TaskStore`](docfill_domain::traits::TaskStore)
//! as exactly one record: `processing`, then `complete` or `error`.
//!
//! # Example Usage
//!
//! ```no_run
//! use docfill_domain::TaskId;
//! use docfill_extractor::{ExtractionTask, ExtractorConfig};
//! use docfill_llm::MockProvider;
//! use docfill_store::MemoryTaskStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(
//!     r#"[{"fieldName":"Customer Name","currentValue":"John Smith","fieldType":"name"}]"#,
//! );
//! let task = ExtractionTask::new(
//!     Arc::new(llm),
//!     Arc::new(MemoryTaskStore::new()),
//!     ExtractorConfig::default(),
//! )?;
//!
//! let record = task
//!     .run(TaskId::new(), b"Dear John Smith, your invoice is due.")
//!     .await?;
//!
//! for field in record.fields().unwrap_or_default() {
//!     println!("{}: {}", field.field_name, field.full_context);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod context;
mod enrich;
mod error;
mod fill;
mod parser;
mod prompt;
mod task;
mod worker;


pub use config::ExtractorConfig;
pub use context::{resolve_context, ContextWindow, ContextWindowResolver, DEFAULT_CONTEXT_WORDS};
pub use enrich::{default_validation_rules, FieldEnricher, FALLBACK_RULE};
pub use error::ExtractorError;
pub use fill::{fill_template, Replacement};
pub use parser::parse_llm_response;
pub use prompt::PromptBuilder;
pub use task::{ExtractionTask, MALFORMED_RESPONSE_MESSAGE};
pub use worker::{ExtractionWorker, TaskHandle};
