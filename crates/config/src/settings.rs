//! Main settings module: the ambient configuration layer every other crate
//! reads from, following the same `config`-crate-over-TOML-plus-env-overrides
//! approach the teacher workspace uses.

use crate::scoring::ScoringConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment: governs how strictly `validate()` treats missing
/// optional configuration (e.g. a missing provider key is always fine; a
/// missing vector store endpoint is only fine outside production).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level settings, assembled from `config/default.toml`, an optional
/// `config/{env}.toml` overlay, and `QUERY_ENGINE__`-prefixed environment
/// variables (highest priority).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub catalogues: CataloguePaths,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub temporal: TemporalSettings,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_scoring()?;
        self.validate_cache()?;
        self.validate_vector_store()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.question_max_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.question_max_chars".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.environment.is_production() && self.server.cors_enabled && self.server.cors_origins.is_empty() {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured; this may block legitimate clients."
            );
        }

        Ok(())
    }

    fn validate_scoring(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;

        for (field, value) in [
            ("min_term_match", scoring.min_term_match),
            ("min_relevance_score", scoring.min_relevance_score),
            ("name_match_threshold_fraction", scoring.name_match_threshold as f32 / 100.0),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: format!("scoring.{field}"),
                    message: format!("must be between 0.0 and 1.0, got {value}"),
                });
            }
        }

        if scoring.default_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scoring.default_results".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_cache(&self) -> Result<(), ConfigError> {
        if self.cache.enabled && self.cache.ttl_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.ttl_days".to_string(),
                message: "must be at least 1 when the cache is enabled".to_string(),
            });
        }
        Ok(())
    }

    fn validate_vector_store(&self) -> Result<(), ConfigError> {
        if self.environment.is_production() && self.vector_store.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "vector_store.endpoint".to_string(),
                message: "must be set in production".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP surface configuration (§6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Cap on question length; requests over this are rejected with 400 (§6.1, §8).
    #[serde(default = "default_question_max_chars")]
    pub question_max_chars: usize,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_question_max_chars() -> usize {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            question_max_chars: default_question_max_chars(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Paths to the five catalogue files (§3, §6.2). A missing file is never
/// fatal — the loader starts that category empty and logs a warning (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CataloguePaths {
    #[serde(default = "default_persons_path")]
    pub persons: String,
    #[serde(default = "default_organizations_path")]
    pub organizations: String,
    #[serde(default = "default_locations_path")]
    pub locations: String,
    #[serde(default = "default_events_path")]
    pub events: String,
    #[serde(default = "default_titles_path")]
    pub titles: String,
}

fn default_persons_path() -> String {
    "config/entities/persons.json".to_string()
}
fn default_organizations_path() -> String {
    "config/entities/organizations.json".to_string()
}
fn default_locations_path() -> String {
    "config/entities/locations.json".to_string()
}
fn default_events_path() -> String {
    "config/entities/events.json".to_string()
}
fn default_titles_path() -> String {
    "config/entities/titles.json".to_string()
}

impl Default for CataloguePaths {
    fn default() -> Self {
        Self {
            persons: default_persons_path(),
            organizations: default_organizations_path(),
            locations: default_locations_path(),
            events: default_events_path(),
            titles: default_titles_path(),
        }
    }
}

/// Connection settings for the persistent vector collection (C4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default = "default_qdrant_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_collection_name")]
    pub collection: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    /// Per-request timeout, default 5s (§5).
    #[serde(default = "default_vector_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_qdrant_endpoint() -> String {
    "http://localhost:6334".to_string()
}
fn default_collection_name() -> String {
    "institutional_knowledge".to_string()
}
fn default_vector_dim() -> usize {
    1024
}
fn default_vector_timeout_ms() -> u64 {
    5_000
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_qdrant_endpoint(),
            collection: default_collection_name(),
            api_key: None,
            vector_dim: default_vector_dim(),
            timeout_ms: default_vector_timeout_ms(),
        }
    }
}

/// Embedding model settings, including the bounded LRU the vector search
/// service caches computed embeddings in (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_embedding_cache_size")]
    pub cache_size: usize,

    /// Per-request timeout for the embedding backend, folded into the
    /// vector-store timeout budget (§5 default: 5s).
    #[serde(default = "default_vector_timeout_ms")]
    pub timeout_ms: u64,

    /// Instruction prefix prepended to query text before embedding, matching
    /// the teacher's instruction-tuned embedding model convention. Documents
    /// already indexed by the (out-of-scope) indexer are embedded without it.
    #[serde(default = "default_retrieval_instruction")]
    pub retrieval_instruction: String,
}

fn default_embedding_model() -> String {
    "qwen3-embedding:0.6b".to_string()
}
fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_embedding_cache_size() -> usize {
    512
}
fn default_retrieval_instruction() -> String {
    "Given a question about a technical institution, retrieve passages that answer it.".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            endpoint: default_embedding_endpoint(),
            cache_size: default_embedding_cache_size(),
            timeout_ms: default_vector_timeout_ms(),
            retrieval_instruction: default_retrieval_instruction(),
        }
    }
}

/// Generative LLM settings (§6.4: `OPENAI_API_KEY` is read directly from the
/// environment rather than through this struct, matching the original).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_timeout_ms() -> u64 {
    60_000
}
fn default_max_tokens() -> usize {
    512
}
fn default_temperature() -> f32 {
    0.3
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
            timeout_ms: default_llm_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// External current-information provider settings (§6.4: its absence
/// disables the temporal path — `enabled` is computed from the presence of
/// `PERPLEXITY_API_KEY` at startup, not stored here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_model")]
    pub model: String,

    #[serde(default = "default_provider_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_provider_model() -> String {
    "sonar".to_string()
}
fn default_provider_endpoint() -> String {
    "https://api.perplexity.ai".to_string()
}
fn default_provider_timeout_ms() -> u64 {
    60_000
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: default_provider_model(),
            endpoint: default_provider_endpoint(),
            timeout_ms: default_provider_timeout_ms(),
        }
    }
}

/// Response cache settings (C6, §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_cache_dir")]
    pub directory: String,

    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,

    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u32,

    #[serde(default = "default_size_ceiling_bytes")]
    pub size_ceiling_bytes: u64,
}

fn default_cache_dir() -> String {
    "data/response_cache".to_string()
}
fn default_ttl_days() -> u32 {
    7
}
fn default_cleanup_interval_hours() -> u32 {
    24
}
fn default_size_ceiling_bytes() -> u64 {
    1024 * 1024 * 1024 // 1 GiB
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_cache_dir(),
            ttl_days: default_ttl_days(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
            size_ceiling_bytes: default_size_ceiling_bytes(),
        }
    }
}

/// Temporal classifier settings (C3, §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalSettings {
    /// A four-digit year within this many years of the current year marks
    /// the question temporal.
    #[serde(default = "default_year_window")]
    pub year_window: i32,
}

fn default_year_window() -> i32 {
    1
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            year_window: default_year_window(),
        }
    }
}

/// Logging/tracing and metrics configuration — ambient even though the
/// spec's non-goals scope out application features, not operability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_metrics_port() -> u16 {
    9090
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
            metrics_port: default_metrics_port(),
        }
    }
}

/// Load settings from files and environment.
///
/// Priority (highest to lowest):
/// 1. `QUERY_ENGINE__`-prefixed environment variables
/// 2. `config/{env}.toml` (if `env` given)
/// 3. `config/default.toml`
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("QUERY_ENGINE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.question_max_chars, 1000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn production_requires_vector_store_endpoint() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.vector_store.endpoint = String::new();
        assert!(settings.validate().is_err());

        settings.vector_store.endpoint = "http://qdrant:6334".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn cache_ttl_must_be_positive_when_enabled() {
        let mut settings = Settings::default();
        settings.cache.ttl_days = 0;
        assert!(settings.validate().is_err());

        settings.cache.enabled = false;
        assert!(settings.validate().is_ok());
    }
}
