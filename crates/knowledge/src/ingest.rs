//! One-shot ingestion: text -> chunks -> embeddings -> vector store.

use crate::chunker::Chunker;
use crate::embeddings::EmbeddingGateway;
use crate::store::VectorStore;
use crate::types::{IngestOptions, IngestReport, StoreRecord, TextChunk};
use chrono::Utc;
use docqa_core::{AppError, AppResult};
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{info, warn};

/// Build a populated store from raw document text.
///
/// Chunks are embedded with at most `options.concurrency` calls in flight.
/// A chunk whose embedding fails is logged and left out; ingestion only
/// fails when nothing could be embedded or the vectors disagree on dimension.
pub async fn ingest_text(
    raw_text: &str,
    gateway: &EmbeddingGateway,
    options: &IngestOptions,
) -> AppResult<(VectorStore, IngestReport)> {
    let start = Instant::now();

    let chunker = Chunker::new(options.chunk_size, options.chunk_overlap)?;
    // Whitespace-only chunks carry nothing to retrieve
    let chunks: Vec<TextChunk> = chunker
        .split(raw_text)
        .into_iter()
        .filter(|chunk| !chunk.text.trim().is_empty())
        .collect();
    let total_chunks = chunks.len();

    if total_chunks == 0 {
        return Err(AppError::IngestionFailure(
            "document has no text to index".to_string(),
        ));
    }

    info!(
        "Embedding {} chunks with {} (model: {}, concurrency: {})",
        total_chunks,
        gateway.provider_name(),
        gateway.model_name(),
        options.concurrency
    );

    let records: Vec<StoreRecord> = stream::iter(chunks)
        .map(|chunk| embed_chunk(gateway, chunk))
        .buffered(options.concurrency.max(1))
        .filter_map(|record| async move { record })
        .collect()
        .await;

    if records.is_empty() {
        return Err(AppError::IngestionFailure(format!(
            "none of the {} chunks could be embedded",
            total_chunks
        )));
    }

    let embedded = records.len();
    let mut store = VectorStore::new();
    store.append(records)?;

    let dimension = store.dimension().unwrap_or(0);
    let report = IngestReport {
        total_chunks,
        embedded,
        dropped: total_chunks - embedded,
        dimension,
        duration_secs: start.elapsed().as_secs_f64(),
        completed_at: Utc::now(),
    };

    info!(
        "Ingestion completed: {} of {} chunks stored (dimension {}) in {:.2}s",
        report.embedded, report.total_chunks, report.dimension, report.duration_secs
    );

    Ok((store, report))
}

async fn embed_chunk(gateway: &EmbeddingGateway, chunk: TextChunk) -> Option<StoreRecord> {
    match gateway.embed(&chunk.text).await {
        Ok(vector) => Some(StoreRecord::new(chunk.text, vector)),
        Err(e) => {
            warn!(
                position = chunk.position,
                offset = chunk.offset,
                "Dropping chunk: {}",
                e
            );
            None
        }
    }
}
