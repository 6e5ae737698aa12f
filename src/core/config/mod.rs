//! Service configuration.
//!
//! Compiled defaults with `DOCQA_*` environment overrides. The RAG
//! constants (context window budget, safety margin, chunking geometry)
//! live here so the answer pipeline and the ingest pipeline read from
//! one place.

pub mod paths;

pub use paths::AppPaths;

use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    /// Base URL of an OpenAI-compatible endpoint (chat + embeddings).
    pub llm_base_url: String,
    /// Optional bearer token for the endpoint.
    pub llm_api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub llm_timeout_secs: u64,

    /// Maximum estimated tokens for a full rendered prompt.
    pub max_context_length: usize,
    /// Headroom reserved below `max_context_length`.
    pub safe_margin: usize,
    /// Cap applied to a single retrieved chunk before assembly.
    pub max_chunk_length: usize,

    /// Chunking window in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,

    pub top_k: usize,
    pub temperature: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            llm_base_url: "http://127.0.0.1:1234".to_string(),
            llm_api_key: None,
            chat_model: "qwen2.5-7b-instruct".to_string(),
            embedding_model: "text-embedding-nomic-embed-text-v1.5".to_string(),
            llm_timeout_secs: 60,
            max_context_length: 6144,
            safe_margin: 200,
            max_chunk_length: 2048,
            chunk_size: 512,
            chunk_overlap: 64,
            top_k: 5,
            temperature: 0.2,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("DOCQA_HOST", defaults.host),
            port: env_parse("DOCQA_PORT", defaults.port),
            llm_base_url: env_or("DOCQA_LLM_BASE_URL", defaults.llm_base_url),
            llm_api_key: env::var("DOCQA_LLM_API_KEY").ok().filter(|v| !v.is_empty()),
            chat_model: env_or("DOCQA_CHAT_MODEL", defaults.chat_model),
            embedding_model: env_or("DOCQA_EMBEDDING_MODEL", defaults.embedding_model),
            llm_timeout_secs: env_parse("DOCQA_LLM_TIMEOUT_SECS", defaults.llm_timeout_secs),
            max_context_length: env_parse("DOCQA_MAX_CONTEXT_LENGTH", defaults.max_context_length),
            safe_margin: env_parse("DOCQA_SAFE_MARGIN", defaults.safe_margin),
            max_chunk_length: env_parse("DOCQA_MAX_CHUNK_LENGTH", defaults.max_chunk_length),
            chunk_size: env_parse("DOCQA_CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: env_parse("DOCQA_CHUNK_OVERLAP", defaults.chunk_overlap),
            top_k: env_parse("DOCQA_TOP_K", defaults.top_k),
            temperature: env_parse("DOCQA_TEMPERATURE", defaults.temperature),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
