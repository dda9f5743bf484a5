//! Semantic search over the vector store

use std::sync::Arc;

use crate::error::Result;
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::ScoredRecord;

/// Embeds a question and returns the closest stored chunks
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl Retriever {
    /// Create a retriever over an embedder and a store
    ///
    /// The embedder must be the one used at ingestion; vectors from a
    /// different model are not comparable.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStoreProvider>) -> Self {
        Self { embedder, store }
    }

    /// Top-`k` chunks with their similarity, closest first
    pub async fn retrieve_scored(&self, question: &str, k: usize) -> Result<Vec<ScoredRecord>> {
        tracing::debug!("Retrieving for question: {}", question);

        let query = self.embedder.embed(question).await?;
        let hits = self.store.query(&query, k).await?;

        match hits.first() {
            Some(best) => {
                tracing::info!(
                    "Retrieved {} chunks from {} (best similarity {:.3})",
                    hits.len(),
                    self.store.name(),
                    best.similarity
                );
                for hit in &hits {
                    tracing::debug!(
                        "  {:.3} {}",
                        hit.similarity,
                        hit.record.metadata.format_citation()
                    );
                }
            }
            None => tracing::info!("Retrieved 0 chunks from {}", self.store.name()),
        }

        Ok(hits)
    }

    /// Top-`k` chunk texts in rank order
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .retrieve_scored(question, k)
            .await?
            .into_iter()
            .map(|hit| hit.record.content)
            .collect())
    }
}
