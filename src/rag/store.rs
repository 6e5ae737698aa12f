//! VectorStore trait — abstract interface for chunk storage backends.
//!
//! The answer pipeline treats the store as a black-box collaborator:
//! it hands over embedded chunks and asks for rank-ordered similarity
//! results. The shipped implementation is `SqliteVectorStore` in the
//! `sqlite` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// A stored document chunk with its bookkeeping metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier (`<doc_id>_<chunk_index>`).
    pub chunk_id: String,
    /// Document this chunk was cut from.
    pub doc_id: String,
    /// The chunk text.
    pub content: String,
    /// Source filename.
    pub source: String,
    /// Position of the chunk within its document.
    pub chunk_index: usize,
    /// Optional extra metadata (JSON).
    pub metadata: Option<serde_json::Value>,
}

/// One similarity-search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Cosine similarity against the query (higher = better).
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embedding vectors. Blank chunks are
    /// skipped. Returns the number of chunks actually stored.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<usize, ApiError>;

    /// Return up to `limit` chunks ranked by similarity to the query
    /// embedding, best first.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError>;

    /// Total stored chunk count.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Delete all chunks belonging to a document. Returns the number
    /// of chunks removed.
    async fn delete_doc(&self, doc_id: &str) -> Result<usize, ApiError>;
}
