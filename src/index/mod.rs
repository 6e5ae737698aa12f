//! Document bookkeeping index.
//!
//! Tracks every uploaded document (id, original filename, saved path,
//! chunk count) in its own SQLite database so the corpus can be
//! audited and rebuilt independently of the vector store.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub doc_id: String,
    pub filename: String,
    pub path: String,
    pub chunks_added: i64,
    pub created_at: String,
}

#[derive(Clone)]
pub struct DocIndex {
    pool: SqlitePool,
}

impl DocIndex {
    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let index = Self { pool };
        index.init_schema().await?;
        Ok(index)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                doc_id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                path TEXT NOT NULL,
                chunks_added INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    pub async fn add_record(
        &self,
        doc_id: &str,
        filename: &str,
        path: &str,
        chunks_added: usize,
    ) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT OR REPLACE INTO documents (doc_id, filename, path, chunks_added, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(doc_id)
        .bind(filename)
        .bind(path)
        .bind(chunks_added as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        tracing::info!(doc_id, filename, chunks_added, "document recorded");
        Ok(())
    }

    pub async fn get(&self, doc_id: &str) -> Result<Option<DocumentRecord>, ApiError> {
        let row = sqlx::query(
            "SELECT doc_id, filename, path, chunks_added, created_at
             FROM documents WHERE doc_id = ?1",
        )
        .bind(doc_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(row.as_ref().map(Self::row_to_record))
    }

    pub async fn list(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        let rows = sqlx::query(
            "SELECT doc_id, filename, path, chunks_added, created_at
             FROM documents ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(rows.iter().map(Self::row_to_record).collect())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> DocumentRecord {
        DocumentRecord {
            doc_id: row.get("doc_id"),
            filename: row.get("filename"),
            path: row.get("path"),
            chunks_added: row.get("chunks_added"),
            created_at: row.get("created_at"),
        }
    }
}
