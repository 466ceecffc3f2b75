//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Turns retrieved chunks into a prompt and the model's reply into an answer.

pub mod ask;
pub mod types;

pub use ask::{answer, build_context, AnswerOptions};
pub use types::{RagResponse, RagSourceRef};
