// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted similarity index over document embeddings.
//!
//! [`SqliteIndex`] keeps each document's text and its f32 embedding as a
//! BLOB in `<dir>/index.db`. Search is an exact cosine scan, which is
//! plenty for a support FAQ that grows one exchange at a time.
//! [`MemoryIndex`] ranks the same way without touching disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parcela_core::ParcelaError;
use rusqlite::OptionalExtension;
use tokio::sync::RwLock;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::types::{IndexedDocument, blob_to_vec, cosine_similarity, vec_to_blob};

/// File name of the index database inside the index directory.
pub const INDEX_FILE: &str = "index.db";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content    TEXT NOT NULL,
    embedding  BLOB NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS index_metadata (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

fn storage_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ParcelaError {
    ParcelaError::Storage {
        source: Box::new(e),
    }
}

/// Nearest-neighbour document index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Append documents. Durable once this returns.
    async fn add_documents(&self, docs: Vec<IndexedDocument>) -> Result<(), ParcelaError>;

    /// Texts of the `k` documents most similar to `query`, best first.
    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<String>, ParcelaError>;

    /// Number of stored documents.
    async fn len(&self) -> Result<usize, ParcelaError>;
}

/// SQLite-backed [`VectorIndex`].
pub struct SqliteIndex {
    conn: Connection,
    path: PathBuf,
}

impl SqliteIndex {
    /// Open (creating if necessary) the index stored in `dir`.
    pub async fn open(dir: &Path) -> Result<Self, ParcelaError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ParcelaError::Storage {
                source: Box::new(e),
            })?;
        let path = dir.join(INDEX_FILE);
        let conn = Connection::open(&path)
            .await
            .map_err(|e: rusqlite::Error| ParcelaError::Storage {
                source: Box::new(e),
            })?;
        conn.call(|conn| {
            conn.pragma_update(None, "synchronous", "FULL")?;
            conn.execute_batch(SCHEMA)?;
            conn.execute(
                "INSERT OR IGNORE INTO index_metadata (key, value) VALUES ('created_at', ?1)",
                rusqlite::params![chrono::Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;
        debug!(path = %path.display(), "similarity index opened");
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embedding width recorded by the first insert, if any.
    pub async fn dimensions(&self) -> Result<Option<usize>, ParcelaError> {
        let value: Option<String> = self
            .conn
            .call(|conn| {
                let v = conn
                    .query_row(
                        "SELECT value FROM index_metadata WHERE key = 'dimensions'",
                        [],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(v)
            })
            .await
            .map_err(storage_err)?;
        Ok(value.and_then(|v| v.parse().ok()))
    }
}

#[async_trait]
impl VectorIndex for SqliteIndex {
    async fn add_documents(&self, docs: Vec<IndexedDocument>) -> Result<(), ParcelaError> {
        let Some(width) = docs.first().map(|d| d.embedding.len()) else {
            return Ok(());
        };
        if docs.iter().any(|d| d.embedding.len() != width) {
            return Err(ParcelaError::Embedding(
                "documents in one batch have different embedding widths".to_string(),
            ));
        }
        if let Some(expected) = self.dimensions().await?
            && expected != width
        {
            return Err(ParcelaError::Embedding(format!(
                "embedding width {width} does not match index width {expected}"
            )));
        }

        let count = docs.len();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO index_metadata (key, value) VALUES ('dimensions', ?1)",
                    rusqlite::params![width.to_string()],
                )?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO documents (content, embedding, created_at) VALUES (?1, ?2, ?3)",
                    )?;
                    for doc in &docs {
                        stmt.execute(rusqlite::params![
                            doc.text,
                            vec_to_blob(&doc.embedding),
                            now
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;
        debug!(count, "documents indexed");
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<String>, ParcelaError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let rows: Vec<(String, Vec<u8>)> = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT content, embedding FROM documents ORDER BY id")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)?;

        Ok(top_k(
            rows.into_iter()
                .map(|(content, blob)| (cosine_similarity(query, &blob_to_vec(&blob)), content)),
            k,
        ))
    }

    async fn len(&self) -> Result<usize, ParcelaError> {
        let count: i64 = self
            .conn
            .call(|conn| {
                let n = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
                Ok(n)
            })
            .await
            .map_err(storage_err)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

/// Texts of the `k` best-scoring candidates.
fn top_k(scored: impl Iterator<Item = (f32, String)>, k: usize) -> Vec<String> {
    let mut scored: Vec<(f32, String)> = scored.collect();
    // Stable sort keeps insertion order among equal scores.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(k).map(|(_, text)| text).collect()
}

/// Non-persistent [`VectorIndex`]. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    docs: RwLock<Vec<IndexedDocument>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn add_documents(&self, docs: Vec<IndexedDocument>) -> Result<(), ParcelaError> {
        let mut stored = self.docs.write().await;
        let width = stored.first().or(docs.first()).map(|d| d.embedding.len());
        if let Some(width) = width
            && let Some(bad) = docs.iter().find(|d| d.embedding.len() != width)
        {
            return Err(ParcelaError::Embedding(format!(
                "embedding width {} does not match index width {width}",
                bad.embedding.len()
            )));
        }
        stored.extend(docs);
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<String>, ParcelaError> {
        let docs = self.docs.read().await;
        Ok(top_k(
            docs.iter()
                .map(|d| (cosine_similarity(query, &d.embedding), d.text.clone())),
            k,
        ))
    }

    async fn len(&self) -> Result<usize, ParcelaError> {
        Ok(self.docs.read().await.len())
    }
}
