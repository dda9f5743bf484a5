//! Local vector store implementations
//!
//! `LocalVectorStore` wraps the SQLite [`VectorDb`] and survives restarts;
//! `InMemoryVectorStore` lives and dies with the process.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::storage::VectorDb;
use crate::types::{ScoredRecord, VectorRecord};

use super::vector_store::{rank_records, VectorStoreProvider};

/// Persistent vector store in the configured persist directory
pub struct LocalVectorStore {
    db: Arc<VectorDb>,
    persist_path: PathBuf,
}

impl LocalVectorStore {
    /// Open (or create) the collection at `persist_path`
    pub fn open(persist_path: impl AsRef<Path>) -> Result<Self> {
        let persist_path = persist_path.as_ref().to_path_buf();
        let db = Arc::new(VectorDb::open(&persist_path)?);
        Ok(Self { db, persist_path })
    }

    /// Create from config
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::open(&config.persist_path)
    }

    /// Directory holding the collection
    pub fn persist_path(&self) -> &Path {
        &self.persist_path
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        // VectorDb is sync, wrap in blocking task
        let db = self.db.clone();
        let records = records.to_vec();
        tokio::task::spawn_blocking(move || db.insert_records(&records)).await?
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        let db = self.db.clone();
        let query = vector.to_vec();

        tokio::task::spawn_blocking(move || {
            let records = db.load_records()?;
            Ok(rank_records(&query, records, k))
        })
        .await?
    }

    async fn len(&self) -> Result<usize> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.count()).await?
    }

    fn name(&self) -> &str {
        "local-sqlite"
    }
}

/// Process-local vector store
#[derive(Default)]
pub struct InMemoryVectorStore {
    records: RwLock<Vec<VectorRecord>>,
}

impl InMemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in insertion order
    pub fn records(&self) -> Vec<VectorRecord> {
        self.records.read().clone()
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        self.records.write().extend_from_slice(records);
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        let records = self.records.read().clone();
        Ok(rank_records(vector, records, k))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
