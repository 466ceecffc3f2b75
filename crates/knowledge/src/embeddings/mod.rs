//! Embedding generation.
//!
//! Providers turn text into vectors; [`EmbeddingGateway`] sits in front of
//! the configured provider and enforces the per-call timeout and the shape
//! of what comes back.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use crate::types::Embedding;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Text embedded by [`EmbeddingGateway::health_check`].
const HEALTH_PROBE: &str = "health check";

/// Single entry point for embedding text, used by ingestion and retrieval.
#[derive(Debug, Clone)]
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    timeout: Duration,
    expected_dimensions: Option<usize>,
}

impl EmbeddingGateway {
    /// Wrap a provider. `expected_dimensions` falls back to the provider's own.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        timeout: Duration,
        expected_dimensions: Option<usize>,
    ) -> Self {
        let expected_dimensions = expected_dimensions.or_else(|| provider.dimensions());
        Self {
            provider,
            timeout,
            expected_dimensions,
        }
    }

    /// Build the provider named in `config` and wrap it.
    pub fn from_config(config: &EmbeddingConfig) -> AppResult<Self> {
        let provider = create_provider(config)?;
        Ok(Self::new(
            provider,
            Duration::from_secs(config.timeout_secs.max(1)),
            config.dimensions,
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embed one text with a single provider call.
    pub async fn embed(&self, text: &str) -> AppResult<Embedding> {
        let vector = tokio::time::timeout(self.timeout, self.provider.embed(text))
            .await
            .map_err(|_| {
                AppError::EmbeddingProvider(format!(
                    "{} did not answer within {:?}",
                    self.provider.provider_name(),
                    self.timeout
                ))
            })?
            .map_err(|e| match e {
                AppError::EmbeddingProvider(_) => e,
                other => AppError::EmbeddingProvider(other.to_string()),
            })?;

        self.validate(&vector)?;
        Ok(vector)
    }

    fn validate(&self, vector: &[f32]) -> AppResult<()> {
        if vector.is_empty() {
            return Err(AppError::EmbeddingProvider(format!(
                "{} returned an empty embedding",
                self.provider.provider_name()
            )));
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(AppError::EmbeddingProvider(format!(
                "{} returned an embedding with non-finite values",
                self.provider.provider_name()
            )));
        }

        if let Some(expected) = self.expected_dimensions {
            if vector.len() != expected {
                return Err(AppError::EmbeddingProvider(format!(
                    "{} model '{}' returned {} dimensions, expected {}",
                    self.provider.provider_name(),
                    self.provider.model_name(),
                    vector.len(),
                    expected
                )));
            }
        }

        Ok(())
    }

    /// Embed a probe text and report the dimension the provider produces.
    pub async fn health_check(&self) -> AppResult<usize> {
        tracing::debug!(
            "Checking embedding provider {} (model: {})",
            self.provider.provider_name(),
            self.provider.model_name()
        );

        let vector = self.embed(HEALTH_PROBE).await.map_err(|e| {
            AppError::HealthCheck(format!(
                "embedding provider '{}' with model '{}' is not usable: {}",
                self.provider.provider_name(),
                self.provider.model_name(),
                e
            ))
        })?;

        tracing::info!(
            "Embedding provider {} ready (model: {}, dimension: {})",
            self.provider.provider_name(),
            self.provider.model_name(),
            vector.len()
        );

        Ok(vector.len())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted providers for failure injection.

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed vector per text; unknown texts fail.
    #[derive(Debug, Default)]
    pub struct ScriptedProvider {
        responses: HashMap<String, AppResult<Vec<f32>>>,
        pub calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, text: &str, vector: &[f32]) -> Self {
            self.responses.insert(text.to_string(), Ok(vector.to_vec()));
            self
        }

        pub fn failing(mut self, text: &str) -> Self {
            self.responses.insert(
                text.to_string(),
                Err(AppError::EmbeddingProvider(format!("scripted failure for '{}'", text))),
            );
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "scripted-v1"
        }

        fn dimensions(&self) -> Option<usize> {
            None
        }

        async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match self.responses.get(text) {
                Some(Ok(vector)) => Ok(vector.clone()),
                Some(Err(e)) => Err(AppError::EmbeddingProvider(e.to_string())),
                None => Err(AppError::EmbeddingProvider(format!("no script for '{}'", text))),
            }
        }
    }

    pub fn gateway(provider: ScriptedProvider) -> EmbeddingGateway {
        EmbeddingGateway::new(Arc::new(provider), Duration::from_secs(5), None)
    }
}
