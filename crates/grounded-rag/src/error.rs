//! Error types for the RAG pipeline

use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
///
/// Nothing in the pipeline retries or recovers from these; every variant
/// propagates to the entrypoint and aborts the current run.
#[derive(Debug, Error)]
pub enum Error {
    /// Source file missing, unreadable, or not a well-formed document
    #[error("Failed to load '{path}': {message}")]
    Load { path: String, message: String },

    /// Invalid configuration (chunk size/overlap, missing credentials, bad TOML)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding service failure (network, auth, quota, malformed response)
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    /// Generation service failure
    #[error("Generation service error: {0}")]
    GenerationService(String),

    /// Vector store read or write failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a load error
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an embedding service error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingService(message.into())
    }

    /// Create a generation service error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationService(message.into())
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("Task join error: {}", err))
    }
}
