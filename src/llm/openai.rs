//! OpenAI-compatible HTTP provider.
//!
//! Works against any endpoint exposing `/v1/chat/completions` and
//! `/v1/embeddings` (OpenAI, LM Studio, vLLM, ...).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::{ChatRequest, LlmReply};
use crate::core::config::Settings;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    embedding_model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        chat_model: String,
        embedding_model: String,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model,
            embedding_model,
            client,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(
            settings.llm_base_url.clone(),
            settings.llm_api_key.clone(),
            settings.chat_model.clone(),
            settings.embedding_model.clone(),
            Duration::from_secs(settings.llm_timeout_secs),
        )
    }

    fn request(&self, url: &str, body: &Value) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/v1/models", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<LlmReply, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.chat_model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(m) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(m));
            }
        }

        let res = self
            .request(&url, &body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "chat completion failed ({}): {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;

        // Normalize the three payload shapes seen in the wild:
        // structured message, bare string, anything else.
        if let Some(content) = payload["choices"][0]["message"]["content"].as_str() {
            return Ok(LlmReply::Message {
                content: content.to_string(),
            });
        }
        if let Value::String(raw) = &payload {
            return Ok(LlmReply::Text(raw.clone()));
        }
        Ok(LlmReply::Text(payload.to_string()))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let res = self
            .request(&url, &body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "embeddings request failed ({}): {}",
                status, text
            )));
        }

        let response: EmbeddingsResponse = res.json().await.map_err(ApiError::internal)?;

        if response.data.len() != inputs.len() {
            return Err(ApiError::Internal(format!(
                "embeddings response returned {} vectors for {} inputs",
                response.data.len(),
                inputs.len()
            )));
        }

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ChatMessage;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(
            server.uri(),
            None,
            "test-chat".to_string(),
            "test-embed".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn chat_parses_structured_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  林冲是豹子头。 "}}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let reply = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        assert_eq!(reply.into_text(), "林冲是豹子头。");
    }

    #[tokio::test]
    async fn chat_stringifies_unexpected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"odd": true})))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let reply = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap();

        assert!(matches!(reply, LlmReply::Text(_)));
        assert!(reply.into_text().contains("odd"));
    }

    #[tokio::test]
    async fn chat_maps_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn embed_returns_one_vector_per_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"embedding": [0.1, 0.2]},
                    {"embedding": [0.3, 0.4]}
                ]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let vectors = provider
            .embed(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.3, 0.4]);
    }

    #[tokio::test]
    async fn embed_rejects_count_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [0.1]}]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider
            .embed(&["one".to_string(), "two".to_string()])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("1 vectors for 2 inputs"));
    }
}
