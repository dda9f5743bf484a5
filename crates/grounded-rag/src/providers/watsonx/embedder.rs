//! watsonx.ai embedding provider
//!
//! Defaults to the slate retriever model. Over-long inputs are truncated by
//! the service (`truncate_input_tokens`), never rejected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::auth::IamAuth;
use crate::config::EmbeddingServiceConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::{ensure_vector_count, EmbeddingProvider};

/// watsonx.ai embedding provider
pub struct WatsonxEmbedder {
    auth: Arc<IamAuth>,
    client: reqwest::Client,
    model_id: String,
    config: EmbeddingServiceConfig,
}

impl WatsonxEmbedder {
    /// Create a new embedder sharing an existing IAM token cache
    pub fn new(
        auth: Arc<IamAuth>,
        model_id: impl Into<String>,
        config: EmbeddingServiceConfig,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            auth,
            client,
            model_id: model_id.into(),
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/ml/v1/text/embeddings",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request<'a>(&'a self, texts: &'a [String]) -> EmbedRequest<'a> {
        EmbedRequest {
            inputs: texts,
            model_id: &self.model_id,
            project_id: &self.config.project_id,
            parameters: EmbedParameters {
                truncate_input_tokens: self.config.max_input_tokens,
                return_options: ReturnOptions { input_text: false },
            },
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
    model_id: &'a str,
    project_id: &'a str,
    parameters: EmbedParameters,
}

#[derive(Serialize)]
struct EmbedParameters {
    truncate_input_tokens: usize,
    return_options: ReturnOptions,
}

#[derive(Serialize)]
struct ReturnOptions {
    input_text: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    results: Vec<EmbedResult>,
}

#[derive(Deserialize)]
struct EmbedResult {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for WatsonxEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let token = self
            .auth
            .get_token()
            .await
            .map_err(|e| Error::embedding(format!("IAM authentication failed: {}", e)))?;

        tracing::debug!(
            "Embedding {} texts with {} (truncate at {} tokens)",
            texts.len(),
            self.model_id,
            self.config.max_input_tokens
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("version", self.config.api_version.as_str())])
            .bearer_auth(token)
            .json(&self.request(texts))
            .send()
            .await
            .map_err(|e| Error::embedding(format!("watsonx embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "watsonx embedding failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse watsonx response: {}", e)))?;

        let vectors: Vec<Vec<f32>> = parsed.results.into_iter().map(|r| r.embedding).collect();
        ensure_vector_count(texts.len(), &vectors)?;
        Ok(vectors)
    }

    fn name(&self) -> &str {
        "watsonx"
    }

    fn model(&self) -> &str {
        &self.model_id
    }
}
