//! Exact cosine-similarity retrieval over a [`VectorStore`].
//!
//! Every query scans the whole store, O(n * D). That is fine for the chunks
//! of a single document; larger corpora would need an ANN index.

use crate::store::VectorStore;
use crate::types::ScoredResult;
use docqa_core::{AppError, AppResult};
use std::cmp::Ordering;

/// Cosine similarity of two vectors, accumulated in `f64`.
///
/// Returns exactly `0.0` when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> AppResult<f64> {
    if a.len() != b.len() {
        return Err(AppError::dimension_mismatch(
            a.len(),
            b.len(),
            "cosine similarity",
        ));
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Return the `k` records most similar to `query`, best first.
///
/// Ties keep insertion order. An empty store gives an empty result.
pub fn search(store: &VectorStore, query: &[f32], k: usize) -> AppResult<Vec<ScoredResult>> {
    if k == 0 {
        return Err(AppError::InvalidInput(
            "k must be at least 1".to_string(),
        ));
    }

    if store.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(dimension) = store.dimension() {
        if query.len() != dimension {
            return Err(AppError::dimension_mismatch(
                dimension,
                query.len(),
                "search query",
            ));
        }
    }

    let mut scored = store
        .records()
        .iter()
        .map(|record| {
            cosine_similarity(query, &record.vector).map(|score| ScoredResult {
                text: record.text.clone(),
                score,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    // sort_by is stable
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(k);

    tracing::debug!(
        "Retrieved {} of {} records (top score: {:.3})",
        scored.len(),
        store.len(),
        scored.first().map(|r| r.score).unwrap_or(0.0)
    );

    Ok(scored)
}
