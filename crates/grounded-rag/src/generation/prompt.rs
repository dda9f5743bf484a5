//! Prompt templates for grounded generation

use super::INSUFFICIENT_CONTEXT;

/// Separator between retrieved chunks in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts, in rank order, into one context block
    pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
        chunks
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Build the grounded prompt
    ///
    /// Context and question are embedded verbatim; nothing is escaped.
    pub fn build_grounded_prompt(context: &str, question: &str) -> String {
        format!(
            "You are an enterprise knowledge assistant.\n\
             \n\
             Answer the question using ONLY the context below.\n\
             If the answer is not present, respond with:\n\
             \"{fallback}\"\n\
             \n\
             Context:\n\
             {context}\n\
             \n\
             Question:\n\
             {question}\n",
            fallback = INSUFFICIENT_CONTEXT,
            context = context,
            question = question,
        )
    }
}
