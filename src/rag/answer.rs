//! Retrieval + answer generation.
//!
//! `QaService` ties the pipeline together: embed the query, pull the
//! top-k chunks from the vector store, assemble a token-budgeted
//! context, render the prompt and call the LLM. LLM failures degrade
//! in two steps (halved context retry, then a fixed apology) and
//! never escape to the HTTP caller.

use std::sync::Arc;

use super::context::assemble;
use super::store::VectorStore;
use super::tokens::{estimate_tokens, truncate_to_tokens};
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ChatMessage, ChatRequest};

/// Returned when retrieval finds nothing; no LLM call is made.
pub const NO_INFORMATION_FOUND: &str = "未找到相关信息";

/// Returned for blank queries at the API layer.
pub const INVALID_QUESTION: &str = "请输入有效的问题";

const RETRY_FAILED_APOLOGY: &str = "抱歉，处理您的请求时发生错误，请尝试简化问题或减少查询内容。";
const GENERIC_APOLOGY: &str = "抱歉，处理您的请求时发生错误，请稍后再试。";

const PROMPT_TEMPLATE: &str = "你是一个企业内部知识助手。请基于以下文档内容回答问题。\n\
如果无法从文档中找到答案，请明确回答\u{201c}未找到相关信息\u{201d}。\n\n\
文档内容:\n{context}\n\n问题: {query}\n\n答案:";

fn render_prompt(context: &str, query: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{query}", query)
}

#[derive(Clone)]
pub struct QaService {
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmProvider>,
    settings: Settings,
}

impl QaService {
    pub fn new(store: Arc<dyn VectorStore>, llm: Arc<dyn LlmProvider>, settings: Settings) -> Self {
        Self {
            store,
            llm,
            settings,
        }
    }

    /// Retrieve + generate, returning the final answer text.
    ///
    /// Retrieval-path failures (embedding transport, store I/O) are
    /// infrastructure errors and propagate; LLM failures degrade
    /// inside `generate_answer`.
    pub async fn ask(&self, query: &str, top_k: usize) -> Result<String, ApiError> {
        let context_docs = self.retrieve_context(query, top_k).await?;
        if context_docs.is_empty() {
            return Ok(NO_INFORMATION_FOUND.to_string());
        }
        Ok(self.generate_answer(query, &context_docs).await)
    }

    /// Embed the query and fetch the top-k chunk texts, best first.
    /// Oversized chunks are capped before assembly so a single
    /// runaway document cannot eat the whole window.
    pub async fn retrieve_context(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<String>, ApiError> {
        let results = self.search(query, top_k).await?;

        let mut docs = Vec::with_capacity(results.len());
        for result in results {
            let doc = result.chunk.content;
            let cost = estimate_tokens(&doc);
            if cost > self.settings.max_context_length {
                let truncated = truncate_to_tokens(&doc, self.settings.max_chunk_length);
                tracing::warn!(
                    from = cost,
                    to = estimate_tokens(&truncated),
                    "retrieved chunk truncated"
                );
                docs.push(truncated);
            } else {
                docs.push(doc);
            }
        }

        Ok(docs)
    }

    /// Raw similarity search, rank-ordered. Used directly by the
    /// search endpoint.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<super::store::ChunkSearchResult>, ApiError> {
        let embeddings = self.llm.embed(&[query.to_string()]).await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("embedding response was empty".to_string()))?;

        self.store.search(&query_embedding, top_k).await
    }

    /// Build the prompt from `context_docs` and call the LLM.
    ///
    /// On failure: retry once with the first half of the selected
    /// chunks (by chunk count) when more than one was selected;
    /// otherwise, or if the retry fails too, return a fixed apology.
    pub async fn generate_answer(&self, query: &str, context_docs: &[String]) -> String {
        let fixed_cost = estimate_tokens(&render_prompt("", query));
        let budget = self
            .settings
            .max_context_length
            .saturating_sub(fixed_cost + self.settings.safe_margin);

        let (selected, used_tokens) = assemble(context_docs, budget);
        tracing::info!(
            chunks = selected.len(),
            tokens = used_tokens,
            "assembled answer context"
        );

        let context = selected.join("\n");
        let mut prompt = render_prompt(&context, query);

        // Belt-and-braces: the estimate is heuristic, so re-check the
        // rendered prompt and squeeze the context once more if needed.
        let total = estimate_tokens(&prompt);
        if total > self.settings.max_context_length {
            tracing::warn!(
                tokens = total,
                limit = self.settings.max_context_length,
                "rendered prompt over limit, re-truncating context"
            );
            let adjusted = truncate_to_tokens(&context, budget.saturating_sub(100));
            prompt = render_prompt(&adjusted, query);
        }

        match self.invoke(&prompt).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    query = %query_prefix(query),
                    tokens = used_tokens,
                    "answer generation failed"
                );

                if selected.len() > 1 {
                    tracing::info!("retrying with reduced context");
                    let reduced = selected[..selected.len() / 2].join("\n");
                    let reduced_prompt = render_prompt(&reduced, query);
                    match self.invoke(&reduced_prompt).await {
                        Ok(answer) => answer,
                        Err(err2) => {
                            tracing::error!(error = %err2, "reduced-context retry failed");
                            RETRY_FAILED_APOLOGY.to_string()
                        }
                    }
                } else {
                    GENERIC_APOLOGY.to_string()
                }
            }
        }
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ApiError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(self.settings.temperature);
        Ok(self.llm.chat(request).await?.into_text())
    }
}

fn query_prefix(query: &str) -> String {
    query.chars().take(30).collect()
}
