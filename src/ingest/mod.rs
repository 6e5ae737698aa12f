//! Upload ingestion pipeline.
//!
//! Saves the raw file, extracts text, chunks it, embeds the chunks
//! through the LLM provider and stores them, then records the
//! document in the bookkeeping index.

use std::path::{Path, PathBuf};

use serde_json::json;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::rag::chunker::chunk_text;
use crate::rag::store::StoredChunk;
use crate::state::AppState;

/// File extensions accepted by the upload endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".txt", ".pptx", ".xlsx", ".md"];

/// Result of running the pipeline on one upload.
#[derive(Debug)]
pub struct IngestOutcome {
    pub doc_id: String,
    pub chunks_added: usize,
    pub message: String,
}

/// Run the full pipeline for one uploaded file.
pub async fn ingest_document(
    state: &AppState,
    bytes: &[u8],
    filename: &str,
) -> Result<IngestOutcome, ApiError> {
    let saved_path = save_upload_file(state, bytes, filename).await?;

    let text = extract_text(&saved_path, bytes);
    if text.trim().is_empty() {
        tracing::warn!(filename, "no text extracted from uploaded file");
        return Ok(IngestOutcome {
            doc_id: String::new(),
            chunks_added: 0,
            message: "No text extracted from file".to_string(),
        });
    }

    let chunks = chunk_text(&text, state.settings.chunk_size, state.settings.chunk_overlap);
    if chunks.is_empty() {
        tracing::warn!(filename, "no chunks created from extracted text");
        return Ok(IngestOutcome {
            doc_id: String::new(),
            chunks_added: 0,
            message: "No chunks created from extracted text".to_string(),
        });
    }

    let doc_id = Uuid::new_v4().simple().to_string();
    let ext = extension_of(filename);

    let embeddings = state.llm.embed(&chunks).await?;
    if embeddings.len() != chunks.len() {
        return Err(ApiError::Internal(
            "embedding count does not match chunk count".to_string(),
        ));
    }

    let items: Vec<(StoredChunk, Vec<f32>)> = chunks
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(idx, (chunk, embedding))| {
            (
                StoredChunk {
                    chunk_id: format!("{}_{}", doc_id, idx),
                    doc_id: doc_id.clone(),
                    content: chunk.clone(),
                    source: filename.to_string(),
                    chunk_index: idx,
                    metadata: Some(json!({
                        "source": filename,
                        "type": ext,
                        "chunk_index": idx,
                    })),
                },
                embedding,
            )
        })
        .collect();

    let added = state.store.insert_batch(items).await?;
    tracing::info!(doc_id, added, "chunks stored");

    // Index write failures are logged but do not fail the upload;
    // the chunks are already searchable.
    if let Err(err) = state
        .index
        .add_record(&doc_id, filename, &saved_path.to_string_lossy(), added)
        .await
    {
        tracing::error!(error = %err, doc_id, "failed to write document record");
    }

    Ok(IngestOutcome {
        doc_id,
        chunks_added: added,
        message: format!(
            "Successfully uploaded and processed {}, added {} chunks.",
            filename, added
        ),
    })
}

/// Persist the raw upload under `documents/` with a unique prefix.
pub async fn save_upload_file(
    state: &AppState,
    bytes: &[u8],
    filename: &str,
) -> Result<PathBuf, ApiError> {
    let base = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    let dst = state
        .paths
        .documents_dir
        .join(format!("{}_{}", Uuid::new_v4().simple(), base));

    tokio::fs::write(&dst, bytes)
        .await
        .map_err(ApiError::internal)?;
    tracing::info!(path = %dst.display(), "saved upload file");
    Ok(dst)
}

/// Extract text from a saved upload.
///
/// Plain-text formats are decoded as UTF-8 with a lossy Latin-1
/// fallback and blank lines squeezed out. Binary formats have no
/// extractor yet and yield empty text, which the caller reports as
/// `chunks_added: 0`.
pub fn extract_text(path: &Path, bytes: &[u8]) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "md" => {
            let decoded = match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!(path = %path.display(), "not valid utf-8, decoding as latin-1");
                    bytes.iter().map(|&b| b as char).collect()
                }
            };
            squeeze_blank_lines(&decoded)
        }
        other => {
            tracing::warn!(extension = other, "no extractor for this file type yet");
            String::new()
        }
    }
}

fn squeeze_blank_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lowercased extension with leading dot, e.g. `.txt`.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
