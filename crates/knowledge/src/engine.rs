//! The serving interface: ingest once, then answer retrieval queries.

use crate::embeddings::{EmbeddingConfig, EmbeddingGateway};
use crate::ingest::ingest_text;
use crate::retriever;
use crate::store::VectorStore;
use crate::types::{IngestOptions, IngestReport, ScoredResult};
use docqa_core::{AppConfig, AppError, AppResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::instrument;

struct Published {
    store: Arc<VectorStore>,
    report: IngestReport,
}

/// Owns the embedding gateway and the store once it is published.
///
/// Queries arriving before [`Engine::ingest`] has completed fail with
/// [`AppError::NotReady`]. After publication the store is shared read-only and
/// retrieval takes no locks.
pub struct Engine {
    gateway: EmbeddingGateway,
    options: IngestOptions,
    published: OnceLock<Published>,
    ingesting: AtomicBool,
}

impl Engine {
    pub fn new(gateway: EmbeddingGateway, options: IngestOptions) -> Self {
        Self {
            gateway,
            options,
            published: OnceLock::new(),
            ingesting: AtomicBool::new(false),
        }
    }

    /// Build the gateway and ingestion options from application config.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let gateway = EmbeddingGateway::from_config(&EmbeddingConfig::from(config))?;
        let options = IngestOptions {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            concurrency: config.embed_concurrency,
        };
        Ok(Self::new(gateway, options))
    }

    pub fn gateway(&self) -> &EmbeddingGateway {
        &self.gateway
    }

    /// Check that the embedding provider answers. See [`EmbeddingGateway::health_check`].
    pub async fn health_check(&self) -> AppResult<usize> {
        self.gateway.health_check().await
    }

    /// Populate and publish the store. Runs at most once successfully.
    ///
    /// A failed ingestion leaves the engine unpublished, and it may be retried.
    pub async fn ingest(&self, raw_text: &str) -> AppResult<IngestReport> {
        if self.published.get().is_some() {
            return Err(AppError::Knowledge(
                "document already ingested; the store is read-only".to_string(),
            ));
        }

        if self
            .ingesting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::Knowledge(
                "ingestion already in progress".to_string(),
            ));
        }

        let result = ingest_text(raw_text, &self.gateway, &self.options).await;

        let outcome = result.and_then(|(store, report)| {
            let published = Published {
                store: Arc::new(store),
                report: report.clone(),
            };
            self.published.set(published).map_err(|_| {
                AppError::Knowledge("document already ingested; the store is read-only".to_string())
            })?;
            Ok(report)
        });

        self.ingesting.store(false, Ordering::Release);
        outcome
    }

    pub fn is_ready(&self) -> bool {
        self.published.get().is_some()
    }

    /// The published store, or `NotReady`.
    pub fn store(&self) -> AppResult<Arc<VectorStore>> {
        self.published
            .get()
            .map(|p| Arc::clone(&p.store))
            .ok_or(AppError::NotReady)
    }

    /// Summary of the ingestion that published the store.
    pub fn report(&self) -> Option<&IngestReport> {
        self.published.get().map(|p| &p.report)
    }

    /// Embed `question` and return the `k` most similar chunks, best first.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn retrieve(&self, question: &str, k: usize) -> AppResult<Vec<ScoredResult>> {
        if question.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        if k == 0 {
            return Err(AppError::InvalidInput("k must be at least 1".to_string()));
        }

        let store = self.store()?;
        let query = self.gateway.embed(question).await?;

        retriever::search(&store, &query, k)
    }
}
