//! Configuration management for docqa.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`docqa.yaml` in the workspace, or an explicit path)
//! - Environment variables (`DOCQA_*`)
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers understood by the knowledge crate.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "mock"];

/// Default config file name, looked up in the workspace directory.
pub const CONFIG_FILE_NAME: &str = "docqa.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Working directory; relative paths in the config file resolve against it
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Text document to ingest at startup
    pub document_path: Option<PathBuf>,

    /// Base URL of the Ollama server used for embeddings and generation
    pub ollama_host: String,

    /// Embedding provider ("ollama" or "mock")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Expected embedding dimension; `None` accepts whatever the provider returns
    pub embedding_dimensions: Option<usize>,

    /// Maximum number of embedding calls in flight during ingestion
    pub embed_concurrency: usize,

    /// Per-call embedding timeout in seconds
    pub embed_timeout_secs: u64,

    /// Generation model identifier
    pub chat_model: String,

    /// Optional Handlebars template overriding the built-in RAG prompt
    pub prompt_template: Option<PathBuf>,

    /// Number of chunks retrieved per question
    pub top_k: usize,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// HTTP bind address for `serve`
    pub bind: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Values supplied on the command line. `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub document_path: Option<PathBuf>,
    pub ollama_host: Option<String>,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub chat_model: Option<String>,
    pub top_k: Option<usize>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    document: Option<DocumentSection>,
    ollama: Option<OllamaSection>,
    embedding: Option<EmbeddingSection>,
    generation: Option<GenerationSection>,
    retrieval: Option<RetrievalSection>,
    server: Option<ServerSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DocumentSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OllamaSection {
    host: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSection {
    model: Option<String>,
    prompt_template: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalSection {
    top_k: Option<usize>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            document_path: None,
            ollama_host: "http://localhost:11434".to_string(),
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimensions: None,
            embed_concurrency: 8,
            embed_timeout_secs: 30,
            chat_model: "phi3".to_string(),
            prompt_template: None,
            top_k: 3,
            chunk_size: 1000,
            chunk_overlap: 100,
            bind: "0.0.0.0:3000".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `DOCQA_WORKSPACE`: Override workspace path
    /// - `DOCQA_CONFIG`: Path to config file
    /// - `DOCQA_DOCUMENT`: Document to ingest
    /// - `DOCQA_OLLAMA_HOST` (or `OLLAMA_HOST`): Ollama base URL
    /// - `DOCQA_EMBEDDING_PROVIDER`, `DOCQA_EMBEDDING_MODEL`, `DOCQA_CHAT_MODEL`
    /// - `DOCQA_BIND`: HTTP bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], with the workspace and config file given
    /// explicitly (e.g. from command-line flags) taking precedence over
    /// `DOCQA_WORKSPACE` and `DOCQA_CONFIG`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("DOCQA_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.workspace.join(CONFIG_FILE_NAME));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(document) = std::env::var("DOCQA_DOCUMENT") {
            config.document_path = Some(PathBuf::from(document));
        }

        if let Ok(host) = std::env::var("DOCQA_OLLAMA_HOST").or_else(|_| std::env::var("OLLAMA_HOST")) {
            config.ollama_host = normalize_host(&host);
        }

        if let Ok(provider) = std::env::var("DOCQA_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }

        if let Ok(model) = std::env::var("DOCQA_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        if let Ok(model) = std::env::var("DOCQA_CHAT_MODEL") {
            config.chat_model = model;
        }

        if let Ok(bind) = std::env::var("DOCQA_BIND") {
            config.bind = bind;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(document) = config_file.document {
            if let Some(path) = document.path {
                result.document_path = Some(result.resolve(&path));
            }
        }

        if let Some(ollama) = config_file.ollama {
            if let Some(host) = ollama.host {
                result.ollama_host = normalize_host(&host);
            }
        }

        if let Some(embedding) = config_file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding_model = model;
            }
            if embedding.dimensions.is_some() {
                result.embedding_dimensions = embedding.dimensions;
            }
            if let Some(concurrency) = embedding.concurrency {
                result.embed_concurrency = concurrency;
            }
            if let Some(timeout) = embedding.timeout_secs {
                result.embed_timeout_secs = timeout;
            }
        }

        if let Some(generation) = config_file.generation {
            if let Some(model) = generation.model {
                result.chat_model = model;
            }
            if let Some(template) = generation.prompt_template {
                result.prompt_template = Some(result.resolve(&template));
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.top_k = top_k;
            }
            if let Some(size) = retrieval.chunk_size {
                result.chunk_size = size;
            }
            if let Some(overlap) = retrieval.chunk_overlap {
                result.chunk_overlap = overlap;
            }
        }

        if let Some(server) = config_file.server {
            if let Some(bind) = server.bind {
                result.bind = bind;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }

        if let Some(document) = overrides.document_path {
            self.document_path = Some(document);
        }

        if let Some(host) = overrides.ollama_host {
            self.ollama_host = normalize_host(&host);
        }

        if let Some(provider) = overrides.embedding_provider {
            self.embedding_provider = provider;
        }

        if let Some(model) = overrides.embedding_model {
            self.embedding_model = model;
        }

        if let Some(model) = overrides.chat_model {
            self.chat_model = model;
        }

        if let Some(top_k) = overrides.top_k {
            self.top_k = top_k;
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if overrides.no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve a path from the config file against the workspace.
    fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }

    /// Document path, or a config error naming the ways to set it.
    pub fn require_document(&self) -> AppResult<&Path> {
        self.document_path.as_deref().ok_or_else(|| {
            AppError::Config(
                "No document configured. Pass --document, set DOCQA_DOCUMENT or document.path in docqa.yaml"
                    .to_string(),
            )
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be greater than 0".to_string()));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if self.embed_concurrency == 0 {
            return Err(AppError::Config(
                "embedding concurrency must be at least 1".to_string(),
            ));
        }

        if self.embed_timeout_secs == 0 {
            return Err(AppError::Config(
                "embedding timeout must be at least 1 second".to_string(),
            ));
        }

        if self.embedding_dimensions == Some(0) {
            return Err(AppError::Config(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
