//! RAG (Retrieval-Augmented Generation) core.
//!
//! - `chunker`: sliding-window text chunking
//! - `tokens`: heuristic token estimation + truncation
//! - `context`: token-budgeted context assembly
//! - `answer`: retrieval + answer generation with degraded retry
//! - `store` / `sqlite`: vector storage

pub mod answer;
pub mod chunker;
pub mod context;
pub mod sqlite;
pub mod store;
pub mod tokens;

pub use answer::QaService;
pub use chunker::chunk_text;
pub use context::assemble;
pub use sqlite::SqliteVectorStore;
pub use store::{ChunkSearchResult, StoredChunk, VectorStore};
pub use tokens::{estimate_tokens, truncate_to_tokens};
