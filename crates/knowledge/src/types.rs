//! Core types for the document engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dense vector produced by an embedding provider.
pub type Embedding = Vec<f32>;

/// A contiguous segment of the source text, produced at ingestion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Exact substring of the source text
    pub text: String,

    /// Ordinal of the chunk within the document
    pub position: usize,

    /// Byte offset of the chunk inside the source text
    pub offset: usize,
}

impl TextChunk {
    /// Byte offset one past the end of the chunk.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// One stored chunk with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub text: String,
    pub vector: Embedding,
}

impl StoreRecord {
    pub fn new(text: impl Into<String>, vector: Embedding) -> Self {
        Self {
            text: text.into(),
            vector,
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// A retrieved chunk and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub text: String,

    /// Cosine similarity in [-1, 1]
    pub score: f64,
}

/// Tuning for a single ingestion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Maximum number of embedding calls in flight
    pub concurrency: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            concurrency: 8,
        }
    }
}

/// Summary of a completed ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Chunks produced by the splitter
    pub total_chunks: usize,

    /// Chunks embedded and stored
    pub embedded: usize,

    /// Chunks dropped after an embedding failure
    pub dropped: usize,

    /// Dimension of every stored vector
    pub dimension: usize,

    pub duration_secs: f64,

    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_end() {
        let chunk = TextChunk {
            text: "héllo".to_string(),
            position: 0,
            offset: 4,
        };
        // 'é' is two bytes
        assert_eq!(chunk.end(), 10);
    }

    #[test]
    fn test_scored_result_serialization() {
        let result = ScoredResult {
            text: "apples are red".to_string(),
            score: 0.5,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"text": "apples are red", "score": 0.5}));
    }

    #[test]
    fn test_ingest_report_uses_camel_case() {
        let report = IngestReport {
            total_chunks: 3,
            embedded: 2,
            dropped: 1,
            dimension: 4,
            duration_secs: 0.1,
            completed_at: Utc::now(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalChunks"], 3);
        assert_eq!(json["dropped"], 1);
    }
}
