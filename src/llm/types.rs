use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Normalized chat-completion payload.
///
/// Endpoints disagree about the shape of a reply: most return a
/// structured message with a `content` field, some return a bare
/// string, and broken ones return something else entirely. The
/// provider classifies the payload into one of these variants so the
/// rest of the pipeline only ever sees plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmReply {
    /// Structured message content.
    Message { content: String },
    /// Raw text payload (or the stringified fallback).
    Text(String),
}

impl LlmReply {
    pub fn into_text(self) -> String {
        match self {
            LlmReply::Message { content } => content.trim().to_string(),
            LlmReply::Text(raw) => raw.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_variants_normalize_to_trimmed_text() {
        let message = LlmReply::Message {
            content: "  structured answer \n".to_string(),
        };
        assert_eq!(message.into_text(), "structured answer");

        let raw = LlmReply::Text("\tplain answer  ".to_string());
        assert_eq!(raw.into_text(), "plain answer");
    }
}
