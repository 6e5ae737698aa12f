use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{docs, health, qa};
use crate::state::AppState;

/// Build the application router.
///
/// Routes:
/// - health check
/// - document upload and bookkeeping
/// - QA search and answer generation
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/docs/upload", post(docs::upload_document))
        .route("/api/docs", get(docs::list_documents))
        .route("/api/docs/:doc_id", get(docs::get_document))
        .route("/api/qa/docs", post(qa::search_documents))
        .route("/api/qa/answer", post(qa::answer_question))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}
