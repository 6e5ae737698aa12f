//! Minimal RAG document-QA service.
//!
//! Accepts document uploads, chunks and embeds their text into a
//! vector store, and answers questions by retrieving relevant chunks
//! and forwarding a token-budgeted prompt to a hosted LLM.

pub mod core;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod server;
pub mod state;
