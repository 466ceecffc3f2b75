//! Search command handler: retrieval only, no generation.

use super::start_engine;
use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Show the chunks most similar to a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of chunks to return
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let engine = start_engine(config).await?;
        let top_k = self.top_k.unwrap_or(config.top_k);
        let results = engine.retrieve(&self.query, top_k).await?;

        if self.json {
            let output = serde_json::json!({
                "query": self.query,
                "topK": top_k,
                "results": results,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No matching chunks.");
            return Ok(());
        }

        for (rank, result) in results.iter().enumerate() {
            println!("#{} score {:.4}", rank + 1, result.score);
            println!("{}", result.text.trim());
            println!();
        }

        Ok(())
    }
}
