//! docqa CLI
//!
//! Main entry point for the docqa command-line tool.
//! Ingests one document at startup and answers questions about it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, SearchCommand, ServeCommand};
use docqa_core::config::{AppConfig, ConfigOverrides};
use docqa_core::logging;
use std::path::PathBuf;
use tracing::Instrument;

/// docqa - question answering over a single document
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a document using local embeddings and LLMs", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/docqa.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Document to ingest (plain text, markdown, HTML or PDF)
    #[arg(short, long, global = true)]
    document: Option<PathBuf>,

    /// Ollama base URL
    #[arg(long, global = true)]
    ollama_host: Option<String>,

    /// Embedding provider (ollama, mock)
    #[arg(long, global = true)]
    embedding_provider: Option<String>,

    /// Embedding model identifier
    #[arg(long, global = true)]
    embedding_model: Option<String>,

    /// Generation model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest the document and serve the HTTP chat API
    Serve(ServeCommand),

    /// Ingest the document and answer one question
    Ask(AskCommand),

    /// Ingest the document and show the chunks closest to a query
    Search(SearchCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Defaults, config file and environment
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    let config = config.with_overrides(ConfigOverrides {
        workspace: cli.workspace,
        config_file: cli.config,
        document_path: cli.document,
        ollama_host: cli.ollama_host,
        embedding_provider: cli.embedding_provider,
        embedding_model: cli.embedding_model,
        chat_model: cli.model,
        top_k: None,
        log_level: cli.log_level,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    logging::init_logging(config.log_level.as_deref(), config.no_color, cli.log_json)?;

    tracing::info!("docqa starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Embedding: {} ({}), generation: {}",
        config.embedding_provider,
        config.embedding_model,
        config.chat_model
    );

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
    };
    let span = tracing::info_span!("command", name = command_name);

    let result = async {
        match cli.command {
            Commands::Serve(cmd) => cmd.execute(&config).await,
            Commands::Ask(cmd) => cmd.execute(&config).await.map_err(Into::into),
            Commands::Search(cmd) => cmd.execute(&config).await.map_err(Into::into),
        }
    }
    .instrument(span)
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
