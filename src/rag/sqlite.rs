//! SQLite-backed vector store.
//!
//! In-process store using SQLite for chunk rows and brute-force
//! cosine similarity for search. Embeddings are kept as little-endian
//! f32 BLOBs. Fine for the corpus sizes a single-node document QA
//! service sees; a dedicated vector database can replace this behind
//! the `VectorStore` trait.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{ChunkSearchResult, StoredChunk, VectorStore};
use crate::core::errors::ApiError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
}

impl SqliteVectorStore {
    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS doc_chunks (
                chunk_id TEXT PRIMARY KEY,
                doc_id TEXT NOT NULL,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                chunk_index INTEGER NOT NULL DEFAULT 0,
                metadata TEXT DEFAULT '{}',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_doc ON doc_chunks(doc_id)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> StoredChunk {
        let metadata_str: String = row.get("metadata");
        let metadata = serde_json::from_str::<Value>(&metadata_str).ok();
        let chunk_index: i64 = row.get("chunk_index");

        StoredChunk {
            chunk_id: row.get("chunk_id"),
            doc_id: row.get("doc_id"),
            content: row.get("content"),
            source: row.get("source"),
            chunk_index: chunk_index.max(0) as usize,
            metadata,
        }
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<usize, ApiError> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;
        let mut inserted = 0usize;

        for (chunk, embedding) in &items {
            if chunk.content.trim().is_empty() {
                tracing::debug!(chunk_id = %chunk.chunk_id, "skipping blank chunk");
                continue;
            }

            let blob = Self::serialize_embedding(embedding);
            let metadata_str = chunk
                .metadata
                .as_ref()
                .map(|m| serde_json::to_string(m).unwrap_or_default())
                .unwrap_or_else(|| "{}".to_string());

            sqlx::query(
                "INSERT OR REPLACE INTO doc_chunks
                 (chunk_id, doc_id, content, source, chunk_index, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&chunk.chunk_id)
            .bind(&chunk.doc_id)
            .bind(chunk.content.trim())
            .bind(&chunk.source)
            .bind(chunk.chunk_index as i64)
            .bind(&metadata_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;

            inserted += 1;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(inserted)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError> {
        let rows = sqlx::query(
            "SELECT chunk_id, doc_id, content, source, chunk_index, metadata, embedding
             FROM doc_chunks",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let mut scored: Vec<ChunkSearchResult> = rows
            .iter()
            .filter_map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                if embedding_bytes.is_empty() {
                    return None;
                }
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let score = Self::cosine_similarity(query_embedding, &stored);

                Some(ChunkSearchResult {
                    chunk: Self::row_to_chunk(row),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit.max(1));

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM doc_chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        let cnt: i64 = row.get("cnt");
        Ok(cnt.max(0) as usize)
    }

    async fn delete_doc(&self, doc_id: &str) -> Result<usize, ApiError> {
        let result = sqlx::query("DELETE FROM doc_chunks WHERE doc_id = ?1")
            .bind(doc_id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(result.rows_affected() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk(doc_id: &str, index: usize, content: &str) -> StoredChunk {
        StoredChunk {
            chunk_id: format!("{}_{}", doc_id, index),
            doc_id: doc_id.to_string(),
            content: content.to_string(),
            source: "test.txt".to_string(),
            chunk_index: index,
            metadata: Some(json!({"source": "test.txt", "chunk_index": index})),
        }
    }

    async fn temp_store() -> (tempfile::TempDir, SqliteVectorStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::with_path(tmp.path().join("vectors.db"))
            .await
            .unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_similarity() {
        let (_tmp, store) = temp_store().await;

        let items = vec![
            (chunk("doc1", 0, "the sky is blue"), vec![1.0, 0.0, 0.0]),
            (chunk("doc1", 1, "the ocean is deep"), vec![0.0, 1.0, 0.0]),
            (chunk("doc1", 2, "math is numbers"), vec![0.0, 0.0, 1.0]),
        ];
        assert_eq!(store.insert_batch(items).await.unwrap(), 3);

        let results = store.search(&[0.9, 0.1, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "the sky is blue");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn blank_chunks_are_skipped_on_insert() {
        let (_tmp, store) = temp_store().await;

        let items = vec![
            (chunk("doc1", 0, "real content"), vec![1.0, 0.0]),
            (chunk("doc1", 1, "   "), vec![0.0, 1.0]),
        ];
        assert_eq!(store.insert_batch(items).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_store_returns_no_results() {
        let (_tmp, store) = temp_store().await;
        let results = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn delete_doc_removes_only_that_document() {
        let (_tmp, store) = temp_store().await;

        let items = vec![
            (chunk("doc1", 0, "from doc one"), vec![1.0, 0.0]),
            (chunk("doc1", 1, "more of doc one"), vec![0.9, 0.1]),
            (chunk("doc2", 0, "from doc two"), vec![0.0, 1.0]),
        ];
        store.insert_batch(items).await.unwrap();

        assert_eq!(store.delete_doc("doc1").await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 1);

        let results = store.search(&[0.0, 1.0], 5).await.unwrap();
        assert_eq!(results[0].chunk.doc_id, "doc2");
    }
}
