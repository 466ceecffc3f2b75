//! RAG response types.

use serde::{Deserialize, Serialize};

/// A retrieved passage that was handed to the model as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSourceRef {
    /// Start of the chunk text, truncated for display
    pub snippet: String,

    /// Cosine similarity between the question and the chunk
    pub score: f64,
}

/// Generated answer plus the passages it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,

    /// Sources in retrieval order, best first
    pub sources: Vec<RagSourceRef>,
}

impl RagResponse {
    /// Highest similarity among the sources, 0.0 when there are none.
    pub fn max_score(&self) -> f64 {
        self.sources.first().map(|s| s.score).unwrap_or(0.0)
    }
}
