//! SQLite database for the persisted vector collection
//!
//! One append-only table holds chunk text, source metadata and the embedding
//! as a little-endian `f32` blob. Rows are never updated.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{ChunkSource, VectorRecord};

/// File name of the database inside the persist directory
pub const VECTOR_DB_FILE: &str = "vectors.sqlite3";

/// SQLite-backed vector collection
pub struct VectorDb {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl VectorDb {
    /// Create or open the collection in the given directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::persistence(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(VECTOR_DB_FILE);
        let conn = Connection::open(&path)
            .map_err(|e| Error::persistence(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::persistence(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        };

        db.migrate()?;
        Ok(db)
    }

    /// Path of the database file, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )
        .map_err(|e| Error::persistence(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vector_records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                page_number INTEGER NOT NULL,
                chunk_index INTEGER NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| Error::persistence(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    /// Append records in a single transaction
    ///
    /// Either every record is written or none is.
    pub fn insert_records(&self, records: &[VectorRecord]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO vector_records
                    (id, content, source, page_number, chunk_index, embedding, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;

            for record in records {
                stmt.execute(params![
                    record.id.to_string(),
                    record.content,
                    record.metadata.source,
                    record.metadata.page_number,
                    record.metadata.chunk_index,
                    encode_embedding(&record.embedding),
                    record.created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All records in insertion order
    pub fn load_records(&self) -> Result<Vec<VectorRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, content, source, page_number, chunk_index, embedding, created_at
            FROM vector_records
            ORDER BY seq
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, Vec<u8>>(5)?,
                row.get::<_, DateTime<Utc>>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, content, source, page_number, chunk_index, blob, created_at) = row?;
            let id = Uuid::parse_str(&id)
                .map_err(|e| Error::persistence(format!("Corrupt record id '{}': {}", id, e)))?;

            records.push(VectorRecord {
                id,
                content,
                embedding: decode_embedding(&blob)?,
                metadata: ChunkSource {
                    source,
                    page_number,
                    chunk_index,
                },
                created_at,
            });
        }

        Ok(records)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM vector_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::persistence(format!(
            "Corrupt embedding blob of {} bytes",
            blob.len()
        )));
    }

    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
