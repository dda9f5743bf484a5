//! Retrieval of relevant chunks for a question

mod search;

pub use search::Retriever;
