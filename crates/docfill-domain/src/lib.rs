//! Docfill Domain Layer
//!
//! This crate contains the data model and trait seams shared by every other
//! Docfill crate. It keeps its dependency surface to identifiers and
//! serialization derives; everything that talks to the outside world lives
//! in the infrastructure crates.
//!
//! ## Key Concepts
//!
//! - **Field**: a template field the AI model believes will vary between uses
//!   of a document, enriched with surrounding context
//! - **Task**: one asynchronous extraction request, identified by a [`TaskId`]
//! - **TaskRecord**: the single status record persisted per task
//!   (`processing`, then exactly one of `complete` or `error`)
//!
//! ## Architecture
//!
//! - Pure data and state-transition logic only
//! - [`traits::TaskStore`] and [`traits::LlmProvider`] define the external
//!   collaborators; implementations live in `docfill-store` and `docfill-llm`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod record;
pub mod task_id;
pub mod traits;

// Re-exports for convenience
pub use field::Field;
pub use record::{FailureKind, TaskRecord, TaskStatus, TransitionError};
pub use task_id::TaskId;
