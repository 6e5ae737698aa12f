//! End-to-end tests over the HTTP surface: upload a document through
//! the multipart endpoint, then ask questions against it with a stub
//! LLM provider standing in for the hosted endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use docqa_backend::core::config::{AppPaths, Settings};
use docqa_backend::core::errors::ApiError;
use docqa_backend::llm::{ChatRequest, LlmProvider, LlmReply};
use docqa_backend::rag::answer::{INVALID_QUESTION, NO_INFORMATION_FOUND};
use docqa_backend::server::router::router;
use docqa_backend::state::AppState;

/// Deterministic stand-in for the hosted endpoint: every text embeds
/// to the same direction (so anything stored is retrievable) and chat
/// always answers with a fixed sentence.
struct StubProvider;

#[async_trait]
impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: ChatRequest) -> Result<LlmReply, ApiError> {
        Ok(LlmReply::Message {
            content: "林冲绰号豹子头，和鲁智深是朋友。".to_string(),
        })
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
    }
}

async fn test_app() -> (tempfile::TempDir, Router) {
    let tmp = tempfile::tempdir().unwrap();
    let paths = Arc::new(AppPaths::at(tmp.path()));
    let state = AppState::with_provider(paths, Settings::default(), Arc::new(StubProvider))
        .await
        .unwrap();
    (tmp, router(state))
}

fn multipart_upload(filename: &str, content: &str) -> Request<Body> {
    let boundary = "test-upload-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{b}--\r\n",
        b = boundary,
    );

    Request::post("/api/docs/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_post(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (_tmp, app) = test_app().await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn upload_then_answer_flow() {
    let (_tmp, app) = test_app().await;

    // Before any upload the store is empty: no information found,
    // and the stub answer never appears.
    let response = app
        .clone()
        .oneshot(json_post("/api/qa/answer", json!({"query": "林冲是谁？"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], NO_INFORMATION_FOUND);

    // Upload a small document.
    let content = "林冲是水浒传中的人物，绰号豹子头。鲁智深是花和尚，他和林冲是朋友。";
    let response = app
        .clone()
        .oneshot(multipart_upload("test.txt", content))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["chunks_added"], 1);
    let doc_id = body["doc_id"].as_str().unwrap().to_string();
    assert!(!doc_id.is_empty());

    // The document shows up in the index.
    let response = app
        .clone()
        .oneshot(Request::get("/api/docs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["documents"][0]["filename"], "test.txt");

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/docs/{}", doc_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Raw search returns the stored chunk.
    let response = app
        .clone()
        .oneshot(json_post("/api/qa/docs", json!({"query": "林冲", "top_k": 3})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body[0]["document"].as_str().unwrap().contains("林冲"));

    // Now the answer path reaches the (stubbed) LLM.
    let response = app
        .clone()
        .oneshot(json_post(
            "/api/qa/answer",
            json!({"query": "林冲是谁，和鲁智深是什么关系？"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("林冲") || answer.contains("鲁智深"));
}

#[tokio::test]
async fn blank_query_gets_fixed_response_without_retrieval() {
    let (_tmp, app) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_post("/api/qa/answer", json!({"query": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], INVALID_QUESTION);

    let response = app
        .oneshot(json_post("/api/qa/docs", json!({"query": ""})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn unsupported_file_type_is_rejected() {
    let (_tmp, app) = test_app().await;

    let response = app
        .oneshot(multipart_upload("malware.exe", "binary stuff"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Unsupported file type"));
}

#[tokio::test]
async fn binary_format_without_extractor_adds_no_chunks() {
    let (_tmp, app) = test_app().await;

    let response = app
        .oneshot(multipart_upload("slides.pptx", "pretend binary"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["chunks_added"], 0);
    assert_eq!(body["doc_id"], "");
}

#[tokio::test]
async fn missing_file_field_is_a_bad_request() {
    let (_tmp, app) = test_app().await;

    let boundary = "empty-boundary";
    let response = app
        .oneshot(
            Request::post("/api/docs/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(format!("--{b}--\r\n", b = boundary)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
