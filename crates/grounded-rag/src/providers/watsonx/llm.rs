//! watsonx.ai text generation provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::auth::IamAuth;
use crate::config::GenerationServiceConfig;
use crate::error::{Error, Result};
use crate::providers::llm::LlmProvider;

/// watsonx.ai generation client (granite chat by default)
pub struct WatsonxLlm {
    auth: Arc<IamAuth>,
    client: reqwest::Client,
    model_id: String,
    config: GenerationServiceConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    input: &'a str,
    model_id: &'a str,
    project_id: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    results: Vec<GenerateResult>,
}

#[derive(Deserialize)]
struct GenerateResult {
    generated_text: String,
}

impl WatsonxLlm {
    /// Create a new client sharing an existing IAM token cache
    pub fn new(
        auth: Arc<IamAuth>,
        model_id: impl Into<String>,
        config: GenerationServiceConfig,
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
            "{}/ml/v1/text/generation",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            input: prompt,
            model_id: &self.model_id,
            project_id: &self.config.project_id,
            parameters: GenerateParameters {
                max_new_tokens: self.config.max_new_tokens,
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for WatsonxLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let token = self
            .auth
            .get_token()
            .await
            .map_err(|e| Error::generation(format!("IAM authentication failed: {}", e)))?;

        tracing::info!("Generating answer with model: {}", self.model_id);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("version", self.config.api_version.as_str())])
            .bearer_auth(token)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| Error::generation(format!("watsonx generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "watsonx generation failed ({}): {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse watsonx response: {}", e)))?;

        parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.generated_text)
            .ok_or_else(|| Error::generation("No generated text in watsonx response"))
    }

    fn name(&self) -> &str {
        "watsonx"
    }

    fn model(&self) -> &str {
        &self.model_id
    }
}
