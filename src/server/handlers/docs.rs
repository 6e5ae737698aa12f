use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::ingest::{self, ALLOWED_EXTENSIONS};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub doc_id: String,
    pub chunks_added: usize,
    pub message: String,
}

/// `POST /api/docs/upload` — multipart upload with a `file` field.
///
/// Validates the extension allow-list, then runs the ingest pipeline:
/// save, extract, chunk, embed, store, record.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file_bytes = None;
    let mut filename = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read file field: {}", e)))?;
            file_bytes = Some(bytes);
        }
    }

    let bytes = file_bytes
        .ok_or_else(|| ApiError::BadRequest("missing 'file' field in multipart body".to_string()))?;
    let filename = filename
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("uploaded_file_{}", Uuid::new_v4().simple()));

    let ext = ingest::extension_of(&filename);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported file type: {}. Allowed types: {}",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let outcome = ingest::ingest_document(&state, &bytes, &filename).await?;

    Ok(Json(UploadResponse {
        filename,
        doc_id: outcome.doc_id,
        chunks_added: outcome.chunks_added,
        message: outcome.message,
    }))
}

/// `GET /api/docs` — all document records, newest first.
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = state.index.list().await?;
    Ok(Json(json!({ "documents": documents })))
}

/// `GET /api/docs/:doc_id` — one document record.
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .index
        .get(&doc_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("document not found: {}", doc_id)))?;
    Ok(Json(json!({ "document": record })))
}
