//! Prompt loading: the built-in RAG prompt and YAML overrides.

use crate::types::PromptDefinition;
use docqa_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in RAG prompt.
pub const DEFAULT_RAG_PROMPT_ID: &str = "rag.default";

const DEFAULT_RAG_TEMPLATE: &str = "Use strictly the following context to answer the question. \
If the answer is not in the context, say 'I don't know'.

Context:
{{context}}

Question: {{question}}

Answer:";

/// The built-in prompt used when no template file is configured.
pub fn default_rag_prompt() -> PromptDefinition {
    PromptDefinition {
        id: DEFAULT_RAG_PROMPT_ID.to_string(),
        title: "Answer strictly from document context".to_string(),
        system: None,
        template: DEFAULT_RAG_TEMPLATE.to_string(),
    }
}

/// Load a prompt definition from a YAML file.
///
/// # Example
/// ```no_run
/// use docqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("prompts/rag.yml"))?;
/// println!("Loaded prompt: {}", prompt.id);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!("Prompt file not found: {:?}", path)));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// A RAG template is useless unless it places both the context and the question.
fn validate_prompt(definition: &PromptDefinition) -> AppResult<()> {
    if definition.id.trim().is_empty() {
        return Err(AppError::Prompt("Prompt id must not be empty".to_string()));
    }

    for variable in ["context", "question"] {
        let placeholder = format!("{{{{{}}}}}", variable);
        if !definition.template.contains(&placeholder) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' template does not reference {}",
                definition.id, placeholder
            )));
        }
    }

    Ok(())
}
