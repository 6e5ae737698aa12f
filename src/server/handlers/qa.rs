use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::rag::answer::INVALID_QUESTION;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QaRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

/// `POST /api/qa/docs` — raw similarity search, rank-ordered.
/// A blank query returns an empty list without touching the store.
pub async fn search_documents(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = payload.query.trim();
    let top_k = payload.top_k.unwrap_or(state.settings.top_k);

    if query.is_empty() {
        tracing::warn!("received empty query text");
        return Ok(Json(json!([])));
    }

    let results = state.qa.search(query, top_k).await?;
    tracing::info!(query, top_k, found = results.len(), "document search");

    let body: Vec<Value> = results
        .into_iter()
        .map(|r| {
            json!({
                "document": r.chunk.content,
                "metadata": r.chunk.metadata,
                "score": r.score,
            })
        })
        .collect();
    Ok(Json(json!(body)))
}

/// `POST /api/qa/answer` — retrieval + answer generation.
/// A blank query yields the fixed invalid-question answer with no
/// retrieval or LLM call.
pub async fn answer_question(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = payload.query.trim();
    let top_k = payload.top_k.unwrap_or(state.settings.top_k);

    if query.is_empty() {
        tracing::warn!("received empty query text");
        return Ok(Json(json!({ "answer": INVALID_QUESTION })));
    }

    let answer = state.qa.ask(query, top_k).await?;
    tracing::info!(
        query,
        answer_prefix = %answer.chars().take(50).collect::<String>(),
        "answer generated"
    );

    Ok(Json(json!({ "query": query, "answer": answer })))
}
