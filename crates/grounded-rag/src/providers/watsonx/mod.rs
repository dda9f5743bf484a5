//! IBM watsonx.ai providers
//!
//! Embedding and generation share one IAM token cache when they use the same
//! API key.

pub mod auth;
pub mod embedder;
pub mod llm;

pub use auth::{AuthError, IamAuth};
pub use embedder::WatsonxEmbedder;
pub use llm::WatsonxLlm;

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;

/// Build the embedder and generator for the watsonx backend
pub fn from_config(config: &RagConfig) -> Result<(WatsonxEmbedder, WatsonxLlm)> {
    let embed_auth = Arc::new(IamAuth::from_env(
        &config.embedding.api_key_env,
        &config.embedding.iam_url,
    )?);

    let same_credentials = config.embedding.api_key_env == config.generation.api_key_env
        && config.embedding.iam_url == config.generation.iam_url;
    let generate_auth = if same_credentials {
        Arc::clone(&embed_auth)
    } else {
        Arc::new(IamAuth::from_env(
            &config.generation.api_key_env,
            &config.generation.iam_url,
        )?)
    };

    let embedder = WatsonxEmbedder::new(
        embed_auth,
        config.embedding_model_id.clone(),
        config.embedding.clone(),
    )?;
    let llm = WatsonxLlm::new(
        generate_auth,
        config.generation_model_id.clone(),
        config.generation.clone(),
    )?;

    Ok((embedder, llm))
}
