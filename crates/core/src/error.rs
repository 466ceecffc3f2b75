//! Error types for docqa.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! the embedding/retrieval engine, generation and prompt rendering.

use thiserror::Error;

/// Unified error type for docqa.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A vector's dimension disagrees with the dimension it is compared against.
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    /// The embedding provider failed or returned an unusable vector
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Ingestion could not produce a usable store
    #[error("Ingestion failed: {0}")]
    IngestionFailure(String),

    /// Queries arrived before ingestion completed
    #[error("Vector store is not ready yet; ingestion has not completed")]
    NotReady,

    /// Startup health check against the embedding provider failed
    #[error("Health check failed: {0}")]
    HealthCheck(String),

    /// Caller supplied input that can never succeed (blank question, k = 0)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Text generation provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge (document reading, engine lifecycle) errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Shorthand for building a [`AppError::DimensionMismatch`].
    pub fn dimension_mismatch(expected: usize, actual: usize, context: impl Into<String>) -> Self {
        AppError::DimensionMismatch {
            expected,
            actual,
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
