//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, upload limit,
//! status store backend, model provider and extractor tuning.

use docfill_extractor::ExtractorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A value is present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 3000)
    pub bind_port: u16,

    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,

    /// Uploads kept for `/generate`; the oldest is evicted first
    pub max_documents: usize,

    /// Where task records are kept
    pub store: StoreConfig,

    /// Which model answers extraction prompts
    pub llm: LlmConfig,

    /// Context window settings
    pub extractor: ExtractorConfig,
}

/// Task store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Records live in process memory
    Memory,
    /// One JSON file per task under `path`
    File,
    /// A SQLite database at `path`
    Sqlite,
}

/// `[store]` section
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend kind
    pub backend: StoreBackend,

    /// Directory (file) or database path (sqlite)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: None,
        }
    }
}

/// Model provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini
    Gemini,
    /// Local Ollama
    Ollama,
    /// Fixed `[]` responses, for local runs without a model
    Mock,
}

/// `[llm]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider kind
    pub provider: ProviderKind,

    /// Model name; the provider's default when absent
    pub model: Option<String>,

    /// API base URL; the provider's default when absent
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// HTTP client timeout for one model call
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: None,
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 3000,
            max_upload_bytes: 10 * 1024 * 1024,
            max_documents: crate::documents::DEFAULT_MAX_DOCUMENTS,
            store: StoreConfig::default(),
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend != StoreBackend::Memory && self.store.path.is_none() {
            return Err(ConfigError::MissingField("store.path".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        if self.max_documents == 0 {
            return Err(ConfigError::Invalid(
                "max_documents must be greater than 0".to_string(),
            ));
        }
        self.extractor.validate().map_err(ConfigError::Invalid)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
