//! Command handlers for the docqa CLI.
//!
//! Every command starts the same way: read the document, check the embedding
//! provider and ingest. The helpers for that live here.

pub mod ask;
pub mod search;
pub mod serve;

pub use ask::AskCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;

use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{read_document, AnswerOptions, Engine};
use docqa_llm::{create_client, LlmClient};
use docqa_prompt::{default_rag_prompt, load_prompt, PromptDefinition};
use std::sync::Arc;

/// Read the configured document, verify the provider and publish the store.
pub async fn start_engine(config: &AppConfig) -> AppResult<Engine> {
    config.validate()?;

    let document = config.require_document()?;
    let text = read_document(document)?;

    let engine = Engine::from_config(config)?;
    engine.health_check().await?;

    let report = engine.ingest(&text).await?;
    tracing::info!(
        "Ingested {:?}: {} chunks stored, {} dropped",
        document,
        report.embedded,
        report.dropped
    );

    Ok(engine)
}

/// The configured prompt template, or the built-in one.
pub fn rag_prompt(config: &AppConfig) -> AppResult<PromptDefinition> {
    match &config.prompt_template {
        Some(path) => load_prompt(path),
        None => Ok(default_rag_prompt()),
    }
}

/// Generation client for the configured Ollama host.
pub fn generation_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    create_client("ollama", Some(&config.ollama_host))
}

/// Answer settings from config, with an optional per-command `top_k`.
pub fn answer_options(config: &AppConfig, top_k: Option<usize>) -> AnswerOptions {
    AnswerOptions::new(top_k.unwrap_or(config.top_k), config.chat_model.clone())
}
