//! Grounded answer generation over an [`LlmProvider`]

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;

use super::prompt::PromptBuilder;

/// Builds the grounded prompt and forwards it to the configured model
pub struct GenerationClient {
    llm: Arc<dyn LlmProvider>,
}

impl GenerationClient {
    /// Create a client over the given provider
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Answer `question` from `context`
    ///
    /// Returns the model's text unmodified.
    pub async fn generate(&self, context: &str, question: &str) -> Result<String> {
        let prompt = PromptBuilder::build_grounded_prompt(context, question);

        tracing::debug!(
            "Prompt for {}/{}: {} chars",
            self.llm.name(),
            self.llm.model(),
            prompt.len()
        );

        self.llm.generate(&prompt).await
    }
}
