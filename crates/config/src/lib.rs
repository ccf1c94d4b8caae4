//! Configuration management for the query engine
//!
//! Supports loading configuration from:
//! - TOML files (`config/default.toml`, `config/{env}.toml`)
//! - Environment variables (`QUERY_ENGINE__` prefix)
//! - Runtime overrides

pub mod prompts;
pub mod scoring;
pub mod settings;

pub use prompts::{format_instruction, provider_system_prompt, system_prompt};
pub use scoring::ScoringConfig;
pub use settings::{
    CacheSettings, CataloguePaths, EmbeddingConfig, LlmSettings, ObservabilityConfig,
    ProviderSettings, RuntimeEnvironment, ServerConfig, Settings, TemporalSettings,
    VectorStoreConfig, load_settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for query_engine_core::Error {
    fn from(err: ConfigError) -> Self {
        query_engine_core::Error::Configuration(err.to_string())
    }
}
