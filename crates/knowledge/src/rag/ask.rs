//! RAG answering orchestration.
//!
//! Retrieves the most similar chunks and asks the generation model to answer
//! strictly from them.

use crate::engine::Engine;
use crate::rag::types::{RagResponse, RagSourceRef};
use crate::types::ScoredResult;
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest};
use docqa_prompt::{build_rag_prompt, PromptDefinition};
use unicode_segmentation::UnicodeSegmentation;

/// Separator placed between retrieved chunks in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Maximum snippet length for source references, in graphemes.
const MAX_SNIPPET_LENGTH: usize = 150;

/// Generation settings for one answer.
#[derive(Debug, Clone)]
pub struct AnswerOptions {
    /// Chunks retrieved as context
    pub top_k: usize,

    /// Generation model identifier
    pub model: String,

    pub temperature: Option<f32>,

    pub max_tokens: Option<u32>,
}

impl AnswerOptions {
    pub fn new(top_k: usize, model: impl Into<String>) -> Self {
        Self {
            top_k,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Answer `question` from the ingested document.
///
/// # Errors
/// `InvalidInput` for a blank question, `NotReady` before ingestion, and
/// `Llm` when generation fails.
pub async fn answer(
    engine: &Engine,
    llm: &dyn LlmClient,
    prompt: &PromptDefinition,
    question: &str,
    options: &AnswerOptions,
) -> AppResult<RagResponse> {
    tracing::info!("Answering question ({} chars)", question.len());

    let results = engine.retrieve(question, options.top_k).await?;

    tracing::info!(
        "Retrieved {} chunks (top score: {:.3})",
        results.len(),
        results.first().map(|r| r.score).unwrap_or(0.0)
    );

    let context = build_context(&results);
    let built = build_rag_prompt(prompt, &context, question)?;

    let mut request = LlmRequest::new(built.user, options.model.clone());
    if let Some(system) = built.system {
        request = request.with_system(system);
    }
    if let Some(temperature) = options.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = options.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    let response = llm.complete(&request).await.map_err(|e| match e {
        AppError::Llm(_) => e,
        other => AppError::Llm(format!("Generation failed: {}", other)),
    })?;

    tracing::debug!(
        "Generation used {} prompt and {} completion tokens",
        response.usage.prompt_tokens,
        response.usage.completion_tokens
    );

    Ok(RagResponse {
        answer: response.content.trim().to_string(),
        sources: results.iter().map(to_source_ref).collect(),
    })
}

/// Join chunk texts, best first, with [`CONTEXT_SEPARATOR`].
pub fn build_context(results: &[ScoredResult]) -> String {
    results
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

fn to_source_ref(result: &ScoredResult) -> RagSourceRef {
    RagSourceRef {
        snippet: truncate_snippet(result.text.trim(), MAX_SNIPPET_LENGTH),
        score: result.score,
    }
}

/// Truncate to at most `max_len` graphemes, preferring a word boundary.
fn truncate_snippet(text: &str, max_len: usize) -> String {
    let Some((cut, _)) = text.grapheme_indices(true).nth(max_len) else {
        return text.to_string();
    };

    let truncated = &text[..cut];
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) if last_space > 0 => format!("{}...", truncated[..last_space].trim_end()),
        _ => format!("{}...", truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::testing::{gateway, ScriptedProvider};
    use crate::embeddings::{EmbeddingConfig, EmbeddingGateway};
    use crate::types::IngestOptions;
    use async_trait::async_trait;
    use docqa_llm::{LlmResponse, LlmUsage, OllamaClient};
    use docqa_prompt::default_rag_prompt;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records the last request and replies with a fixed text.
    struct RecordingLlm {
        reply: String,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl RecordingLlm {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_request: Mutex::new(None),
            }
        }

        fn last_prompt(&self) -> String {
            self.last_request
                .lock()
                .unwrap()
                .as_ref()
                .map(|r| r.prompt.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 2),
            })
        }

        async fn list_models(&self) -> AppResult<Vec<String>> {
            Ok(vec!["phi3".to_string()])
        }
    }

    async fn ready_engine() -> Engine {
        let provider = ScriptedProvider::new()
            .with("Apples are red.", &[1.0, 0.0])
            .with("What color are apples?", &[0.9, 0.1]);
        let engine = Engine::new(
            gateway(provider),
            IngestOptions {
                chunk_size: 50,
                chunk_overlap: 0,
                concurrency: 1,
            },
        );
        engine.ingest("Apples are red.").await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_answer_renders_context_and_trims_reply() {
        let engine = ready_engine().await;
        let llm = RecordingLlm::new("  Red.\n");

        let response = answer(
            &engine,
            &llm,
            &default_rag_prompt(),
            "What color are apples?",
            &AnswerOptions::new(3, "phi3"),
        )
        .await
        .unwrap();

        assert_eq!(response.answer, "Red.");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].snippet, "Apples are red.");

        let prompt = llm.last_prompt();
        assert!(prompt.contains("Context:\nApples are red."));
        assert!(prompt.contains("Question: What color are apples?"));
        assert!(prompt.contains("I don't know"));
    }

    #[tokio::test]
    async fn test_answer_before_ingest() {
        let engine = Engine::new(gateway(ScriptedProvider::new()), IngestOptions::default());
        let llm = RecordingLlm::new("unused");

        let result = answer(
            &engine,
            &llm,
            &default_rag_prompt(),
            "anything?",
            &AnswerOptions::new(3, "phi3"),
        )
        .await;

        assert!(matches!(result, Err(AppError::NotReady)));
        assert!(llm.last_request.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_answer_with_ollama_generation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"model": "phi3", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "phi3",
                "response": " Apples grow in orchards. ",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = EmbeddingConfig {
            provider: "mock".to_string(),
            dimensions: Some(64),
            ..Default::default()
        };
        let engine = Engine::new(
            EmbeddingGateway::from_config(&config).unwrap(),
            IngestOptions::default(),
        );
        engine
            .ingest("Apples grow in orchards and ripen in autumn.")
            .await
            .unwrap();

        let llm = OllamaClient::with_base_url(server.uri());
        let response = answer(
            &engine,
            &llm,
            &default_rag_prompt(),
            "Where do apples grow?",
            &AnswerOptions::new(3, "phi3"),
        )
        .await
        .unwrap();

        assert_eq!(response.answer, "Apples grow in orchards.");
        assert!(response.max_score() > 0.0);
    }

    #[test]
    fn test_build_context_joins_in_rank_order() {
        let results = vec![
            ScoredResult {
                text: "First chunk".to_string(),
                score: 0.9,
            },
            ScoredResult {
                text: "Second chunk".to_string(),
                score: 0.4,
            },
        ];

        assert_eq!(build_context(&results), "First chunk\n\n---\n\nSecond chunk");
    }

    #[test]
    fn test_truncate_snippet() {
        assert_eq!(truncate_snippet("Short text", 100), "Short text");

        let long = "This is a very long text that needs to be truncated at some point";
        let result = truncate_snippet(long, 30);
        assert_eq!(result, "This is a very long text that...");
    }

    #[test]
    fn test_truncate_snippet_multibyte() {
        let text = "é".repeat(20);
        let result = truncate_snippet(&text, 5);
        assert_eq!(result, format!("{}...", "é".repeat(5)));
    }
}
