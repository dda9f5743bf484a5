//! Page, chunk, and vector record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::privacy;

/// Supported source file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// One page of a loaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Source path as given to the loader
    pub source: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Extracted text of the page
    pub content: String,
}

impl Page {
    /// Create a new page
    pub fn new(source: impl Into<String>, page_number: u32, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page_number,
            content: content.into(),
        }
    }
}

/// Where a chunk came from; persisted as record metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkSource {
    /// Source path of the document
    pub source: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Position of the chunk within the whole document
    pub chunk_index: u32,
}

impl ChunkSource {
    /// Format source for display
    pub fn format_citation(&self) -> String {
        format!("{}, Page {}, Chunk {}", self.source, self.page_number, self.chunk_index)
    }
}

/// A window of page text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text content, rewritten in place by [`Chunk::mask_pii`]
    pub content: String,
    /// Source information
    pub source: ChunkSource,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(content: String, source: ChunkSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source,
        }
    }

    /// Replace PII in the content with placeholder tokens
    ///
    /// Returns `true` if anything was masked.
    pub fn mask_pii(&mut self) -> bool {
        let masked = privacy::mask(&self.content);
        let changed = masked != self.content;
        self.content = masked;
        changed
    }
}

/// A persisted chunk: masked text, its embedding, and source metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Record ID (the chunk ID)
    pub id: Uuid,
    /// Masked chunk text
    pub content: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Source metadata
    pub metadata: ChunkSource,
    /// Ingestion timestamp
    pub created_at: DateTime<Utc>,
}

impl VectorRecord {
    /// Build a record from a (masked) chunk and its embedding
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id,
            content: chunk.content,
            embedding,
            metadata: chunk.source,
            created_at: Utc::now(),
        }
    }
}

/// A record returned from a similarity query
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    /// The matched record
    pub record: VectorRecord,
    /// Cosine similarity to the query (-1.0 to 1.0, higher is closer)
    pub similarity: f32,
}
