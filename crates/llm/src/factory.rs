//! LLM provider factory.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a generation client for the named provider.
///
/// # Arguments
/// * `provider` - Provider identifier (currently only "ollama")
/// * `endpoint` - Optional custom endpoint URL
///
/// # Errors
/// Returns `AppError::Llm` if the provider is unknown.
pub fn create_client(provider: &str, endpoint: Option<&str>) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Llm(format!(
            "Unknown generation provider: {}. Supported: ollama",
            provider
        ))),
    }
}
