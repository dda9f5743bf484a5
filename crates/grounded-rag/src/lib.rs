//! grounded-rag: PII-masking retrieval-augmented question answering
//!
//! Documents are loaded page by page, split into overlapping character
//! windows, scrubbed of email addresses and long digit runs, embedded, and
//! appended to a persistent vector collection. Questions are answered by a
//! language model restricted to the top-ranked chunks; when nothing is
//! retrieved the fixed [`generation::INSUFFICIENT_CONTEXT`] reply is returned
//! without calling the model.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod privacy;
pub mod providers;
pub mod retrieval;
pub mod storage;
pub mod types;

pub use config::{BackendProvider, RagConfig};
pub use error::{Error, Result};
pub use generation::INSUFFICIENT_CONTEXT;
pub use pipeline::{IngestReport, RagPipeline};
pub use types::{Chunk, ChunkSource, FileType, Page, ScoredRecord, VectorRecord};
