//! Storage module for the persisted vector collection
//!
//! Provides SQLite-based persistence for vector records.

mod database;

pub use database::{VectorDb, VECTOR_DB_FILE};
