//! Provider abstractions for embeddings, LLM and vector storage
//!
//! Trait-based so the pipeline can run against the hosted watsonx services or
//! test doubles, and against persistent or in-memory stores.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod vector_store;
pub mod watsonx;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use local::{InMemoryVectorStore, LocalVectorStore};
pub use vector_store::{cosine_similarity, VectorStoreProvider};
