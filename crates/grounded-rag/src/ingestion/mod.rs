//! Document ingestion: loading and chunking

mod chunker;
mod loader;

pub use chunker::{split, TextChunker};
pub use loader::DocumentLoader;
