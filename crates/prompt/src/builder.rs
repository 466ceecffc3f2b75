//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let user = render_template(&definition.template, variables)?;

    Ok(BuiltPrompt {
        system: definition.system.clone(),
        user,
        source_prompt_id: definition.id.clone(),
    })
}

/// Build the RAG prompt for a question and the retrieved context.
///
/// # Example
/// ```
/// use docqa_prompt::{build_rag_prompt, default_rag_prompt};
///
/// let built = build_rag_prompt(&default_rag_prompt(), "Paris is in France.", "Where is Paris?").unwrap();
/// assert!(built.user.contains("Where is Paris?"));
/// ```
pub fn build_rag_prompt(
    definition: &PromptDefinition,
    context: &str,
    question: &str,
) -> AppResult<BuiltPrompt> {
    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());
    variables.insert("question".to_string(), question.to_string());
    build_prompt(definition, &variables)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::default_rag_prompt;

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape_html() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "a < b & \"c\"".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "a < b & \"c\"");
    }

    #[test]
    fn test_render_invalid_template() {
        let vars = HashMap::new();
        let result = render_template("{{#if}}", &vars);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_build_rag_prompt_default() {
        let built = build_rag_prompt(
            &default_rag_prompt(),
            "The fox is brown.\n\n---\n\nThe dog is lazy.",
            "What color is the fox?",
        )
        .unwrap();

        assert_eq!(built.source_prompt_id, "rag.default");
        assert!(built.system.is_none());
        assert!(built.user.contains("Context:\nThe fox is brown."));
        assert!(built.user.contains("Question: What color is the fox?"));
        assert!(built.user.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn test_build_prompt_keeps_system() {
        let definition = PromptDefinition {
            id: "rag.custom".to_string(),
            title: String::new(),
            system: Some("Answer in one sentence.".to_string()),
            template: "{{context}}|{{question}}".to_string(),
        };

        let built = build_rag_prompt(&definition, "ctx", "q").unwrap();
        assert_eq!(built.user, "ctx|q");
        assert_eq!(built.system.as_deref(), Some("Answer in one sentence."));
    }
}
