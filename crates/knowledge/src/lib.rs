//! Single-document retrieval engine.
//!
//! A document is read once, split into overlapping chunks, embedded through
//! an [`EmbeddingGateway`] and kept in an in-memory [`VectorStore`]. Questions
//! are embedded the same way and matched by exact cosine similarity.
//!
//! # Example
//! ```no_run
//! use docqa_core::AppConfig;
//! use docqa_knowledge::Engine;
//!
//! # async fn example() -> docqa_core::AppResult<()> {
//! let config = AppConfig::load()?;
//! let engine = Engine::from_config(&config)?;
//! engine.health_check().await?;
//! engine.ingest("Apples are red.\n\nCars are fast.").await?;
//!
//! for result in engine.retrieve("What is red?", 3).await? {
//!     println!("{:.3} {}", result.score, result.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod embeddings;
pub mod engine;
pub mod ingest;
pub mod parser;
pub mod rag;
pub mod retriever;
pub mod store;
pub mod types;

pub use chunker::Chunker;
pub use embeddings::{EmbeddingConfig, EmbeddingGateway, EmbeddingProvider};
pub use engine::Engine;
pub use ingest::ingest_text;
pub use parser::read_document;
pub use rag::{answer, AnswerOptions, RagResponse, RagSourceRef};
pub use retriever::{cosine_similarity, search};
pub use store::VectorStore;
pub use types::{Embedding, IngestOptions, IngestReport, ScoredResult, StoreRecord, TextChunk};
