//! Answer generation constrained to retrieved context

mod client;
mod prompt;

pub use client::GenerationClient;
pub use prompt::{PromptBuilder, CONTEXT_SEPARATOR};

/// Fixed reply when retrieval finds nothing, also the model's instructed fallback
pub const INSUFFICIENT_CONTEXT: &str = "Insufficient context to answer this question.";
