//! Serve command: HTTP chat API over the ingested document.
//!
//! The listener is bound only after ingestion has published the store.
//!
//! Routes:
//! - `POST /api/chat` with `{"question": "..."}` (`pregunta` is accepted too)
//! - `GET /health`

use super::{answer_options, generation_client, rag_prompt, start_engine};
use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Args;
use docqa_core::{config::AppConfig, AppError};
use docqa_knowledge::{answer, AnswerOptions, Engine, RagResponse};
use docqa_llm::LlmClient;
use docqa_prompt::PromptDefinition;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

/// Ingest the document, then serve the chat API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing serve command");

        let bind = self.bind.as_deref().unwrap_or(&config.bind);
        let addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("invalid bind address {}", bind))?;

        let prompt = rag_prompt(config)?;
        let llm = generation_client(config)?;
        check_chat_model(llm.as_ref(), &config.chat_model).await;

        let engine = start_engine(config).await?;

        let state = ServerState {
            engine: Arc::new(engine),
            llm,
            prompt: Arc::new(prompt),
            options: Arc::new(answer_options(config, None)),
        };

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;
        tracing::info!("Listening on http://{}", addr);

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server shutdown")?;

        Ok(())
    }
}

/// Warn early when the generation model is missing; answers would fail later.
async fn check_chat_model(llm: &dyn LlmClient, model: &str) {
    match llm.list_models().await {
        Ok(models) => {
            let installed = models
                .iter()
                .any(|m| m == model || m.strip_suffix(":latest") == Some(model));
            if !installed {
                tracing::warn!(
                    "Generation model '{}' is not installed (run: ollama pull {})",
                    model,
                    model
                );
            }
        }
        Err(e) => tracing::warn!("Could not list generation models: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub llm: Arc<dyn LlmClient>,
    pub prompt: Arc<PromptDefinition>,
    pub options: Arc<AnswerOptions>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default, alias = "pregunta")]
    question: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<usize>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

async fn chat(
    State(state): State<ServerState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<RagResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| bad_request(e.body_text()))?;

    let question = request
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| bad_request("question is required"))?;

    let response = answer(
        &state.engine,
        state.llm.as_ref(),
        &state.prompt,
        &question,
        &state.options,
    )
    .await
    .map_err(error_response)?;

    Ok(Json(response))
}

async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthBody>) {
    match state.engine.store() {
        Ok(store) => (
            StatusCode::OK,
            Json(HealthBody {
                ready: true,
                chunks: Some(store.len()),
                dimension: store.dimension(),
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                ready: false,
                chunks: None,
                dimension: None,
            }),
        ),
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn error_response(err: AppError) -> ApiError {
    let status = match &err {
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Chat request failed: {}", err);
    }

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::AppResult;
    use docqa_knowledge::{EmbeddingConfig, EmbeddingGateway, IngestOptions};
    use docqa_llm::{LlmRequest, LlmResponse, LlmUsage};
    use docqa_prompt::default_rag_prompt;

    struct CannedLlm {
        reply: Option<String>,
    }

    #[async_trait::async_trait]
    impl LlmClient for CannedLlm {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            match &self.reply {
                Some(reply) => Ok(LlmResponse {
                    content: reply.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                None => Err(AppError::Llm("model not found".to_string())),
            }
        }

        async fn list_models(&self) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn mock_engine() -> Engine {
        let config = EmbeddingConfig {
            provider: "mock".to_string(),
            dimensions: Some(64),
            ..Default::default()
        };
        Engine::new(
            EmbeddingGateway::from_config(&config).unwrap(),
            IngestOptions::default(),
        )
    }

    fn state(engine: Engine, reply: Option<&str>) -> ServerState {
        ServerState {
            engine: Arc::new(engine),
            llm: Arc::new(CannedLlm {
                reply: reply.map(str::to_string),
            }),
            prompt: Arc::new(default_rag_prompt()),
            options: Arc::new(AnswerOptions::new(3, "phi3")),
        }
    }

    async fn ready_state(reply: Option<&str>) -> ServerState {
        let engine = mock_engine();
        engine
            .ingest("Apples are red and grow in orchards.")
            .await
            .unwrap();
        state(engine, reply)
    }

    /// Serve on an ephemeral port and return the base URL.
    async fn spawn(state: ServerState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn post_chat(base: &str, body: &str) -> (u16, serde_json::Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", base))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_chat_answers_question() {
        let base = spawn(ready_state(Some(" Red. ")).await).await;

        let (status, body) = post_chat(&base, r#"{"question": "What color are apples?"}"#).await;

        assert_eq!(status, 200);
        assert_eq!(body["answer"], "Red.");
        assert_eq!(body["sources"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_accepts_pregunta_alias() {
        let base = spawn(ready_state(Some("Rojo.")).await).await;

        let (status, body) = post_chat(&base, r#"{"pregunta": "¿De qué color son?"}"#).await;

        assert_eq!(status, 200);
        assert_eq!(body["answer"], "Rojo.");
    }

    #[tokio::test]
    async fn test_chat_missing_question_is_bad_request() {
        let base = spawn(ready_state(Some("unused")).await).await;

        let (status, body) = post_chat(&base, "{}").await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("question"));

        let (status, _) = post_chat(&base, r#"{"question": "   "}"#).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_chat_malformed_json_is_bad_request() {
        let base = spawn(ready_state(Some("unused")).await).await;

        let (status, body) = post_chat(&base, "{not json").await;
        assert_eq!(status, 400);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_chat_before_ingestion_is_unavailable() {
        let base = spawn(state(mock_engine(), Some("unused"))).await;

        let (status, _) = post_chat(&base, r#"{"question": "What color are apples?"}"#).await;
        assert_eq!(status, 503);
    }

    #[tokio::test]
    async fn test_chat_generation_failure_is_internal_error() {
        let base = spawn(ready_state(None).await).await;

        let (status, body) = post_chat(&base, r#"{"question": "What color are apples?"}"#).await;
        assert_eq!(status, 500);
        assert!(body["error"].as_str().unwrap().contains("model not found"));
    }

    #[tokio::test]
    async fn test_health_reports_readiness() {
        let not_ready = spawn(state(mock_engine(), None)).await;
        let response = reqwest::get(format!("{}/health", not_ready)).await.unwrap();
        assert_eq!(response.status().as_u16(), 503);

        let ready = spawn(ready_state(None).await).await;
        let response = reqwest::get(format!("{}/health", ready)).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["ready"], true);
        assert_eq!(body["chunks"], 1);
        assert_eq!(body["dimension"], 64);
    }

    #[tokio::test]
    async fn test_check_chat_model_tolerates_missing_model() {
        let llm = CannedLlm { reply: None };
        check_chat_model(&llm, "phi3").await;
    }
}
