//! Ask command handler.

use super::{answer_options, generation_client, rag_prompt, start_engine};
use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::answer;

/// Answer one question about the document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of chunks to use as context
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Maximum tokens in response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Temperature for response generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if self.question.trim().is_empty() {
            return Err(AppError::InvalidInput("question must not be empty".to_string()));
        }

        let prompt = rag_prompt(config)?;
        let llm = generation_client(config)?;
        let engine = start_engine(config).await?;

        let mut options = answer_options(config, self.top_k);
        options.max_tokens = self.max_tokens;
        options.temperature = self.temperature;

        let response = answer(&engine, llm.as_ref(), &prompt, &self.question, &options).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        } else {
            println!("{}", response.answer);

            if tracing::enabled!(tracing::Level::DEBUG) {
                for source in &response.sources {
                    tracing::debug!("Source ({:.3}): {}", source.score, source.snippet);
                }
            }
        }

        Ok(())
    }
}
