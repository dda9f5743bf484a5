//! Fixed-size, overlapping character windows over page text

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkSource, Page};

/// Text chunker with configurable size and overlap
///
/// Sizes are counted in characters, not bytes, so a window never splits a
/// code point. Text is not trimmed: dropping the first `overlap` characters
/// of every chunk after the first rebuilds the page exactly.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters shared with the previous chunk of the same page
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create a chunker from the pipeline configuration
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split pages into chunks, preserving page order and left-to-right order
    pub fn split(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            for window in self.windows(&page.content) {
                let source = ChunkSource {
                    source: page.source.clone(),
                    page_number: page.page_number,
                    chunk_index: chunks.len() as u32,
                };
                chunks.push(Chunk::new(window.to_string(), source));
            }
        }

        chunks
    }

    /// Windows of `chunk_size` characters advancing by `chunk_size - overlap`
    pub fn windows<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Byte offset of every char boundary, including the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = boundaries.len() - 1;

        let mut windows = Vec::new();
        if total == 0 {
            return windows;
        }

        let step = self.chunk_size - self.overlap;
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(total);
            windows.push(&text[boundaries[start]..boundaries[end]]);
            if end == total {
                break;
            }
            start += step;
        }

        windows
    }
}

/// Split pages with the given size and overlap
///
/// Fails with [`Error::Config`] when `overlap >= chunk_size`.
pub fn split(pages: &[Page], chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(TextChunker::new(chunk_size, overlap)?.split(pages))
}
