//! Docfill Server
//!
//! HTTP front end for document template extraction. Uploads start an
//! extraction task, clients poll its status, then post replacement values to
//! download a filled-in copy of the document.

#![warn(missing_docs)]

pub mod config;
pub mod documents;
pub mod handlers;

use config::{LlmConfig, ProviderKind, ServerConfig, StoreBackend, StoreConfig};
use docfill_domain::traits::LlmProvider;
use docfill_extractor::{ExtractionTask, ExtractionWorker, ExtractorError};
use docfill_llm::{gemini, AnyProvider, GeminiProvider, LlmError, MockProvider, OllamaProvider};
use docfill_store::{AnyTaskStore, FileTaskStore, MemoryTaskStore, SqliteTaskStore, StoreError};
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Model provider could not be created
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// Task store could not be opened
    #[error("Task store error: {0}")]
    Store(#[from] StoreError),

    /// Extraction pipeline could not be created
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Create the configured model provider
///
/// The API key for Gemini is read from the environment variable named in
/// the configuration, never from the file itself.
pub fn build_provider(config: &LlmConfig) -> Result<AnyProvider, ServerError> {
    let provider = match config.provider {
        ProviderKind::Gemini => {
            let key = std::env::var(&config.api_key_env).map_err(|_| {
                LlmError::Config(format!(
                    "Environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
            let model = config.model.as_deref().unwrap_or(gemini::DEFAULT_MODEL);
            let endpoint = config.endpoint.as_deref().unwrap_or(gemini::DEFAULT_ENDPOINT);
            AnyProvider::Gemini(GeminiProvider::with_endpoint(
                endpoint,
                key,
                model,
                config.timeout_secs,
            )?)
        }
        ProviderKind::Ollama => {
            let model = config.model.as_deref().unwrap_or("llama3");
            let endpoint = config
                .endpoint
                .as_deref()
                .unwrap_or(docfill_llm::ollama::DEFAULT_ENDPOINT);
            AnyProvider::Ollama(OllamaProvider::with_timeout(
                endpoint,
                model,
                config.timeout_secs,
            )?)
        }
        ProviderKind::Mock => AnyProvider::Mock(MockProvider::default()),
    };
    Ok(provider)
}

/// Open the configured task store
pub fn build_store(config: &StoreConfig) -> Result<AnyTaskStore, ServerError> {
    let path = || {
        config
            .path
            .as_ref()
            .ok_or_else(|| config::ConfigError::MissingField("store.path".to_string()))
    };

    let store = match config.backend {
        StoreBackend::Memory => AnyTaskStore::Memory(MemoryTaskStore::new()),
        StoreBackend::File => AnyTaskStore::File(FileTaskStore::new(path()?)?),
        StoreBackend::Sqlite => AnyTaskStore::Sqlite(SqliteTaskStore::new(path()?)?),
    };
    Ok(store)
}

/// Build application state from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let provider = build_provider(&config.llm)?;
    let label = provider.model_name().to_string();
    let store = build_store(&config.store)?;

    let task = ExtractionTask::new(
        Arc::new(provider),
        Arc::new(store),
        config.extractor.clone(),
    )?;

    Ok(AppState::new(ExtractionWorker::new(task), label).with_max_documents(config.max_documents))
}

/// Start the HTTP server
///
/// Builds the provider, store and extraction worker from configuration,
/// then serves until the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Docfill server");
    info!("Bind address: {}", config.bind_addr());
    info!("Store backend: {:?}", config.store.backend);
    info!("Upload limit: {} bytes", config.max_upload_bytes);
    info!("Retained documents: {}", config.max_documents);

    let state = build_state(&config)?;
    info!("LLM provider: {}", state.provider);

    let app = create_router(state, config.max_upload_bytes);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_from_config() {
        let config = LlmConfig {
            provider: ProviderKind::Mock,
            ..Default::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "mock");
    }

    #[test]
    fn test_gemini_without_key_fails() {
        let config = LlmConfig {
            api_key_env: "DOCFILL_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_provider(&config),
            Err(ServerError::Llm(LlmError::Config(_)))
        ));
    }

    #[test]
    fn test_file_store_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            backend: StoreBackend::File,
            path: Some(dir.path().join("tasks")),
        };
        assert!(matches!(build_store(&config), Ok(AnyTaskStore::File(_))));
    }

    #[test]
    fn test_store_path_required() {
        let config = StoreConfig {
            backend: StoreBackend::Sqlite,
            path: None,
        };
        assert!(matches!(build_store(&config), Err(ServerError::Config(_))));
    }
}
