//! Prompt assembly for docqa.
//!
//! This crate turns retrieved passages and a user question into the text sent
//! to the generation model:
//! - YAML-based prompt definitions (with a built-in RAG default)
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, build_rag_prompt};
pub use loader::{default_rag_prompt, load_prompt};
pub use types::{BuiltPrompt, PromptDefinition};
