//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ScoredRecord, VectorRecord};

/// Trait for append-only vector storage and similarity search
///
/// The similarity metric is cosine similarity for every implementation.
///
/// Implementations:
/// - `LocalVectorStore`: SQLite file under the configured persist path
/// - `InMemoryVectorStore`: process-local, for tests and dry runs
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Append records; existing records are never replaced or deduplicated
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Return up to `k` records closest to `vector`, closest first
    ///
    /// An empty store yields an empty vector.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredRecord>>;

    /// Get total number of records stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Cosine similarity; 0.0 for mismatched dimensions or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Score every record against `query` and keep the `k` best
///
/// The sort is stable, so equal scores keep the order records were given in
/// (insertion order for both stores).
pub fn rank_records<I>(query: &[f32], records: I, k: usize) -> Vec<ScoredRecord>
where
    I: IntoIterator<Item = VectorRecord>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredRecord> = records
        .into_iter()
        .map(|record| {
            let similarity = cosine_similarity(query, &record.embedding);
            ScoredRecord { record, similarity }
        })
        .collect();

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(k);
    scored
}
