//! Embedding configuration.

use docqa_core::AppConfig;
use serde::{Deserialize, Serialize};

/// Dimension used by the mock provider when none is configured.
pub const DEFAULT_MOCK_DIMENSIONS: usize = 384;

/// Settings for the embedding provider and the gateway in front of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Provider base URL (ignored by the mock provider)
    pub base_url: String,

    /// Expected vector dimension; `None` accepts the provider's
    pub dimensions: Option<usize>,

    /// Per-call timeout enforced by the gateway
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per embedding call, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            base_url: "http://localhost:11434".to_string(),
            dimensions: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl From<&AppConfig> for EmbeddingConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            provider: config.embedding_provider.clone(),
            model: config.embedding_model.clone(),
            base_url: config.ollama_host.clone(),
            dimensions: config.embedding_dimensions,
            timeout_secs: config.embed_timeout_secs,
            max_retries: default_max_retries(),
        }
    }
}
