//! Configuration for the RAG pipeline
//!
//! Every component receives its settings from a [`RagConfig`] at construction
//! time. The config can be loaded from a TOML file; any key left out falls back
//! to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file for the CLI
pub const CONFIG_ENV_VAR: &str = "GROUNDED_RAG_CONFIG";

/// Main RAG pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Backend provider for embedding and generation services
    pub backend: BackendProvider,
    /// Directory holding the persisted vector collection
    pub persist_path: PathBuf,
    /// Embedding model identifier
    pub embedding_model_id: String,
    /// Generation model identifier
    pub generation_model_id: String,
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question
    pub top_k: usize,
    /// Embedding service settings
    pub embedding: EmbeddingServiceConfig,
    /// Generation service settings
    pub generation: GenerationServiceConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            backend: BackendProvider::default(),
            persist_path: PathBuf::from("vectorstore"),
            embedding_model_id: "ibm/slate-125m-english-rtrvr-v2".to_string(),
            generation_model_id: "ibm/granite-13b-chat-v2".to_string(),
            chunk_size: 800,
            chunk_overlap: 100,
            top_k: 4,
            embedding: EmbeddingServiceConfig::default(),
            generation: GenerationServiceConfig::default(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| Error::config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration for the CLI
    ///
    /// An explicit path wins, then the `GROUNDED_RAG_CONFIG` environment
    /// variable, then the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Check invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::config("top_k must be at least 1"));
        }
        if self.embedding_model_id.trim().is_empty() {
            return Err(Error::config("embedding_model_id must not be empty"));
        }
        if self.generation_model_id.trim().is_empty() {
            return Err(Error::config("generation_model_id must not be empty"));
        }
        if self.embedding.max_input_tokens == 0 {
            return Err(Error::config("embedding.max_input_tokens must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::config(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            )));
        }
        Ok(())
    }
}

/// Backend provider selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// IBM watsonx.ai hosted embedding and generation APIs
    #[default]
    Watsonx,
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingServiceConfig {
    /// Service base URL
    pub base_url: String,
    /// Project (tenant) identifier sent with each request
    pub project_id: String,
    /// API version date for watsonx.ai
    pub api_version: String,
    /// Inputs longer than this many tokens are truncated, not rejected
    pub max_input_tokens: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// IAM token endpoint used to exchange the API key
    pub iam_url: String,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://us-south.ml.cloud.ibm.com".to_string(),
            project_id: "skills-network".to_string(),
            api_version: "2023-10-25".to_string(),
            max_input_tokens: 512,
            timeout_secs: 60,
            api_key_env: "WATSONX_APIKEY".to_string(),
            iam_url: "https://iam.cloud.ibm.com/identity/token".to_string(),
        }
    }
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationServiceConfig {
    /// Service base URL
    pub base_url: String,
    /// Project (tenant) identifier sent with each request
    pub project_id: String,
    /// API version date for watsonx.ai
    pub api_version: String,
    /// Upper bound on generated tokens
    pub max_new_tokens: u32,
    /// Sampling temperature, kept low for factual answers
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// IAM token endpoint used to exchange the API key
    pub iam_url: String,
}

impl Default for GenerationServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://us-south.ml.cloud.ibm.com".to_string(),
            project_id: "skills-network".to_string(),
            api_version: "2023-10-25".to_string(),
            max_new_tokens: 300,
            temperature: 0.2,
            timeout_secs: 120,
            api_key_env: "WATSONX_APIKEY".to_string(),
            iam_url: "https://iam.cloud.ibm.com/identity/token".to_string(),
        }
    }
}
