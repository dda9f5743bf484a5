//! End-to-end ingestion and question answering
//!
//! Every stage is awaited before the next starts. Ingestion writes to the
//! store only after loading, chunking, masking and embedding have all
//! succeeded, so a failed run persists nothing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{BackendProvider, RagConfig};
use crate::error::Result;
use crate::generation::{GenerationClient, PromptBuilder, INSUFFICIENT_CONTEXT};
use crate::ingestion::{DocumentLoader, TextChunker};
use crate::providers::embedding::ensure_vector_count;
use crate::providers::{
    watsonx, EmbeddingProvider, LlmProvider, LocalVectorStore, VectorStoreProvider,
};
use crate::retrieval::Retriever;
use crate::types::{ScoredRecord, VectorRecord};

/// Summary of one ingestion run
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// File that was ingested
    pub source: PathBuf,
    /// Pages extracted from the file
    pub pages: usize,
    /// Chunks embedded and stored
    pub chunks: usize,
    /// Chunks in which at least one email or phone number was masked
    pub masked_chunks: usize,
    /// Configured collection directory
    pub persist_path: PathBuf,
}

/// RAG pipeline wiring loader, chunker, masker, embedder, store and generator
pub struct RagPipeline {
    config: RagConfig,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    retriever: Retriever,
    generator: GenerationClient,
}

impl RagPipeline {
    /// Assemble a pipeline from explicit providers
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = TextChunker::from_config(&config)?;
        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&store));

        Ok(Self {
            config,
            chunker,
            embedder,
            store,
            retriever,
            generator: GenerationClient::new(llm),
        })
    }

    /// Build providers for the configured backend and open the persistent store
    pub fn from_config(config: RagConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing RAG pipeline (backend: {:?})", config.backend);

        let (embedder, llm): (Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>) =
            match config.backend {
                BackendProvider::Watsonx => {
                    let (embedder, llm) = watsonx::from_config(&config)?;
                    (Arc::new(embedder), Arc::new(llm))
                }
            };

        let store = Arc::new(LocalVectorStore::from_config(&config)?);

        tracing::info!(
            "Providers ready (embedding: {}/{}, llm: {}/{}, store: {})",
            embedder.name(),
            embedder.model(),
            llm.name(),
            llm.model(),
            store.persist_path().display()
        );

        Self::new(config, embedder, llm, store)
    }

    /// Active configuration
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Vector store the pipeline reads and writes
    pub fn store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.store
    }

    /// Load, chunk, mask, embed and persist one document
    pub async fn ingest(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let path = path.as_ref().to_path_buf();
        tracing::info!("Ingesting {}", path.display());

        let load_path = path.clone();
        let pages =
            tokio::task::spawn_blocking(move || DocumentLoader::load(&load_path)).await??;

        let mut chunks = self.chunker.split(&pages);
        tracing::info!(
            "Split {} pages into {} chunks (size {}, overlap {})",
            pages.len(),
            chunks.len(),
            self.chunker.chunk_size(),
            self.chunker.overlap()
        );

        let masked_chunks = chunks
            .iter_mut()
            .map(|chunk| chunk.mask_pii())
            .filter(|&masked| masked)
            .count();
        if masked_chunks > 0 {
            tracing::info!("Masked PII in {} chunks", masked_chunks);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        ensure_vector_count(chunks.len(), &embeddings)?;
        tracing::info!(
            "Embedded {} chunks with {}",
            embeddings.len(),
            self.embedder.model()
        );

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord::from_chunk(chunk, embedding))
            .collect();

        if records.is_empty() {
            tracing::warn!("No text extracted from {}, nothing stored", path.display());
        } else {
            self.store.upsert(&records).await?;
        }

        tracing::info!("Stored {} records in {}", records.len(), self.store.name());

        Ok(IngestReport {
            source: path,
            pages: pages.len(),
            chunks: records.len(),
            masked_chunks,
            persist_path: self.config.persist_path.clone(),
        })
    }

    /// Chunk texts most relevant to `question`, using the configured `top_k`
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        self.retriever.retrieve(question, self.config.top_k).await
    }

    /// Scored records most relevant to `question`
    pub async fn retrieve_scored(&self, question: &str) -> Result<Vec<ScoredRecord>> {
        self.retriever
            .retrieve_scored(question, self.config.top_k)
            .await
    }

    /// Answer `question` from the stored documents only
    ///
    /// With nothing retrieved the model is not called and the fixed
    /// insufficient-context sentence is returned.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let chunks = self.retrieve(question).await?;
        if chunks.is_empty() {
            tracing::info!("No context retrieved, skipping generation");
            return Ok(INSUFFICIENT_CONTEXT.to_string());
        }

        let context = PromptBuilder::build_context(&chunks);
        self.generator.generate(&context, question).await
    }
}
