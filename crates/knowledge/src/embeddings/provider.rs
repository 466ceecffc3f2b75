//! Embedding provider trait and factory.

use crate::embeddings::config::{EmbeddingConfig, DEFAULT_MOCK_DIMENSIONS};
use crate::embeddings::providers::{MockProvider, OllamaProvider};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Dimension the provider is configured to produce, if known up front
    fn dimensions(&self) -> Option<usize>;

    /// Generate the embedding for one text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider based on configuration.
///
/// No network traffic happens here; reachability is checked separately by
/// [`EmbeddingGateway::health_check`](crate::embeddings::EmbeddingGateway::health_check).
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "mock" => {
            let dimensions = config.dimensions.unwrap_or(DEFAULT_MOCK_DIMENSIONS);
            Ok(Arc::new(MockProvider::new(dimensions)))
        }

        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock",
            config.provider
        ))),
    }
}
