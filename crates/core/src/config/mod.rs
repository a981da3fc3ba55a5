//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SOMO_*)
//! 2. TOML config file (if SOMO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheTuning;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SOMO_*)
/// 2. TOML config file (if SOMO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Redis URL for the shared query cache.
    ///
    /// Set via SOMO_REDIS_URL. When unset or unreachable the cache runs
    /// process-local.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Seconds a cached query result stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Seconds a coalescing lock lives for summarize/ask computations.
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,

    /// Seconds a coalescing lock lives for revision computations, which
    /// answer many questions and run longer.
    #[serde(default = "default_revision_lock_ttl_secs")]
    pub revision_lock_ttl_secs: u64,

    /// Upper bound in seconds on how long a caller waits for another
    /// worker's in-flight computation before computing itself.
    #[serde(default = "default_lock_wait_secs")]
    pub lock_wait_secs: u64,

    /// Milliseconds between cache polls while waiting on a lock owner.
    #[serde(default = "default_lock_poll_ms")]
    pub lock_poll_ms: u64,

    /// OpenAI API key for completions and embeddings.
    ///
    /// Set via SOMO_OPENAI_API_KEY. Required at startup.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Chat completion model.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model used to vectorize queries for retrieval.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Pinecone API key.
    ///
    /// Set via SOMO_PINECONE_API_KEY. Required at startup.
    #[serde(default)]
    pub pinecone_api_key: Option<String>,

    /// Pinecone index host, e.g. `https://myindex-abc123.svc.pinecone.io`.
    ///
    /// Set via SOMO_PINECONE_INDEX_HOST. Required at startup.
    #[serde(default)]
    pub pinecone_index_host: Option<String>,

    /// Optional Pinecone namespace scoping all queries.
    #[serde(default)]
    pub pinecone_namespace: Option<String>,

    /// Maximum revision questions answered concurrently.
    #[serde(default = "default_max_concurrent_questions")]
    pub max_concurrent_questions: usize,

    /// HTTP request timeout in milliseconds for upstream calls.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for upstream HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_lock_ttl_secs() -> u64 {
    30
}

fn default_revision_lock_ttl_secs() -> u64 {
    60
}

fn default_lock_wait_secs() -> u64 {
    30
}

fn default_lock_poll_ms() -> u64 {
    500
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_max_concurrent_questions() -> usize {
    5
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_user_agent() -> String {
    "somo-tutor/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            lock_ttl_secs: default_lock_ttl_secs(),
            revision_lock_ttl_secs: default_revision_lock_ttl_secs(),
            lock_wait_secs: default_lock_wait_secs(),
            lock_poll_ms: default_lock_poll_ms(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            pinecone_api_key: None,
            pinecone_index_host: None,
            pinecone_namespace: None,
            max_concurrent_questions: default_max_concurrent_questions(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Cache timing knobs for `QueryCache`.
    pub fn cache_tuning(&self) -> CacheTuning {
        CacheTuning {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            poll_interval: Duration::from_millis(self.lock_poll_ms),
            wait_timeout: Duration::from_secs(self.lock_wait_secs),
        }
    }

    /// Lock TTL for summarize/ask computations.
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    /// Lock TTL for revision computations.
    pub fn revision_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.revision_lock_ttl_secs)
    }

    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SOMO_`
    /// 2. TOML file from `SOMO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SOMO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SOMO_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the OpenAI API key is available.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "openai_api_key".into(),
            hint: "Set SOMO_OPENAI_API_KEY environment variable".into(),
        })
    }

    /// Check that the Pinecone API key is available.
    pub fn require_pinecone_api_key(&self) -> Result<&str, ConfigError> {
        self.pinecone_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "pinecone_api_key".into(),
            hint: "Set SOMO_PINECONE_API_KEY environment variable".into(),
        })
    }

    /// Check that the Pinecone index host is available.
    pub fn require_pinecone_index_host(&self) -> Result<&str, ConfigError> {
        self.pinecone_index_host.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "pinecone_index_host".into(),
            hint: "Set SOMO_PINECONE_INDEX_HOST environment variable".into(),
        })
    }
}
