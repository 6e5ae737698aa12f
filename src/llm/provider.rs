use async_trait::async_trait;

use super::types::{ChatRequest, LlmReply};
use crate::core::errors::ApiError;

/// Abstract interface to a hosted LLM endpoint.
///
/// Covers the two calls the service makes: chat completion for answer
/// generation and embeddings for chunk/query vectors. Transport and
/// quota failures surface as `ApiError`; the answer pipeline decides
/// how far to degrade.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Check if the endpoint is reachable.
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// Chat completion (non-streaming).
    async fn chat(&self, request: ChatRequest) -> Result<LlmReply, ApiError>;

    /// Generate embeddings, one vector per input.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}
