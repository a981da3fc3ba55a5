//! summarize tool implementation.
//!
//! Produces a bilingual revision summary of one chapter. Retrieval pulls a
//! wide slice of the chapter's content chunks; the longest chunks are
//! stuffed into the prompt under a token budget so the model sees the most
//! substantial material first.

use crate::state::ServerState;
use crate::tools::{json_result, llm_error, retrieval_error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use somo_client::{SWAHILI_UNAVAILABLE, estimate_tokens, parse_bilingual, prompt, retrieval::filter};
use somo_core::{BilingualAnswer, Error};

/// Cache operation name for summaries.
const OP: &str = "summarize";

/// Content chunks retrieved per chapter.
const RETRIEVAL_K: usize = 200;

/// Chunks shorter than this are headings and page furniture.
const MIN_CHUNK_CHARS: usize = 50;

/// Token budget for stuffed context.
const CONTEXT_TOKEN_BUDGET: usize = 10_000;

/// Parameters for the summarize tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummarizeParams {
    /// Chapter to summarize, e.g. "3" or "3.2".
    pub chapter: String,
}

/// Output from the summarize tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummarizeOutput {
    /// Always "summary".
    pub mode: String,
    /// Chapter the summary covers.
    pub chapter: String,
    /// Bilingual summary text.
    pub response: BilingualAnswer,
    /// RFC 3339 timestamp of when this response was produced.
    pub generated_at: String,
    /// Whether the response came from the cache.
    pub cache_hit: bool,
}

fn output(chapter: &str, response: BilingualAnswer, cache_hit: bool) -> SummarizeOutput {
    SummarizeOutput {
        mode: "summary".to_string(),
        chapter: chapter.to_string(),
        response,
        generated_at: chrono::Utc::now().to_rfc3339(),
        cache_hit,
    }
}

/// Implementation of the summarize tool.
pub async fn summarize_impl(state: &ServerState, params: SummarizeParams) -> Result<CallToolResult, McpError> {
    let chapter = params.chapter.trim().to_string();
    if chapter.is_empty() {
        return Err(Error::InvalidInput("chapter cannot be empty".into()).into());
    }

    if let Some(answer) = state.cache.get::<BilingualAnswer>(OP, &chapter).await {
        tracing::info!("summary cache hit for chapter {chapter}");
        return json_result(&output(&chapter, answer, true));
    }

    let owns_lock = state.cache.acquire_lock(OP, &chapter, state.config.lock_ttl()).await;
    if !owns_lock {
        if let Some(answer) = state.cache.wait_for::<BilingualAnswer>(OP, &chapter).await {
            return json_result(&output(&chapter, answer, true));
        }
        // lock holder went away or the wait window elapsed; compute here
    }

    match compute_summary(state, &chapter).await {
        Ok(answer) => {
            state.cache.set(&answer, OP, &chapter).await;
            json_result(&output(&chapter, answer, false))
        }
        Err(e) => {
            if owns_lock {
                state.cache.release_lock(OP, &chapter).await;
            }
            Err(e.into())
        }
    }
}

async fn compute_summary(state: &ServerState, chapter: &str) -> Result<BilingualAnswer, Error> {
    let docs = state
        .docs
        .search(
            "chapter summary overview key points",
            Some(filter::chapter_filter("content", chapter)),
            RETRIEVAL_K,
        )
        .await
        .map_err(retrieval_error)?;

    let mut chunks: Vec<&str> = docs
        .iter()
        .map(|d| d.content.trim())
        .filter(|c| c.chars().count() > MIN_CHUNK_CHARS)
        .collect();
    chunks.sort_by_key(|c| std::cmp::Reverse(c.chars().count()));

    let mut kept = Vec::new();
    let mut used_tokens = 0usize;
    for chunk in chunks {
        let cost = estimate_tokens(chunk);
        if used_tokens + cost > CONTEXT_TOKEN_BUDGET {
            continue;
        }
        used_tokens += cost;
        kept.push(chunk);
    }

    if kept.is_empty() {
        tracing::warn!("no usable content chunks for chapter {chapter}");
        return Ok(BilingualAnswer {
            english: format!("No usable content found for Chapter {chapter}."),
            swahili: SWAHILI_UNAVAILABLE.to_string(),
        });
    }

    tracing::info!("summarizing chapter {chapter}: {} chunks, ~{used_tokens} tokens", kept.len());

    let context = kept.join("\n\n");
    let full_prompt = prompt::summary_prompt(chapter, &context);
    let raw = state.llm.complete(&full_prompt).await.map_err(llm_error)?;

    Ok(parse_bilingual(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FailingLlm, FakeDocs, FakeLlm, content_doc, test_state};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const REPLY: &str = "ENGLISH:\nThe chapter covers cells.\n\nSWAHILI:\nSura inahusu seli.";

    fn chapter_docs() -> Vec<somo_client::Document> {
        vec![
            content_doc(
                "The cell is the basic structural and functional unit of all living organisms.",
                "2.1",
            ),
            content_doc("short heading", "2.1"),
            content_doc(
                "Plant cells differ from animal cells in having a cell wall, chloroplasts and a large vacuole.",
                "2.2",
            ),
        ]
    }

    #[tokio::test]
    async fn test_empty_chapter_rejected() {
        let state = test_state(Arc::new(FakeDocs::new(vec![])), Arc::new(FakeLlm::new(REPLY)));
        let result = summarize_impl(&state, SummarizeParams { chapter: "  ".into() }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_summary_miss_then_hit() {
        let llm = Arc::new(FakeLlm::new(REPLY));
        let state = test_state(Arc::new(FakeDocs::new(chapter_docs())), llm.clone());

        let first = summarize_impl(&state, SummarizeParams { chapter: "2".into() }).await;
        assert!(first.is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);

        let second = summarize_impl(&state, SummarizeParams { chapter: "2".into() }).await;
        assert!(second.is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1, "second call must be served from cache");
    }

    #[tokio::test]
    async fn test_concurrent_calls_coalesce() {
        let llm = Arc::new(FakeLlm::slow(REPLY, Duration::from_millis(100)));
        let state = Arc::new(test_state(Arc::new(FakeDocs::new(chapter_docs())), llm.clone()));

        let a = {
            let state = state.clone();
            tokio::spawn(async move { summarize_impl(&state, SummarizeParams { chapter: "2".into() }).await })
        };
        let b = {
            let state = state.clone();
            tokio::spawn(async move { summarize_impl(&state, SummarizeParams { chapter: "2".into() }).await })
        };

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1, "losing caller must wait, not recompute");
    }

    #[tokio::test]
    async fn test_no_content_produces_placeholder_without_llm_call() {
        let llm = Arc::new(FakeLlm::new(REPLY));
        let state = test_state(Arc::new(FakeDocs::new(vec![])), llm.clone());

        let result = summarize_impl(&state, SummarizeParams { chapter: "9".into() }).await;
        assert!(result.is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

        let cached: Option<somo_core::BilingualAnswer> = state.cache.get("summarize", "9").await;
        assert!(cached.unwrap().english.contains("No usable content"));
    }

    #[tokio::test]
    async fn test_failure_releases_lock() {
        let state = test_state(Arc::new(FakeDocs::new(chapter_docs())), Arc::new(FailingLlm));

        let result = summarize_impl(&state, SummarizeParams { chapter: "2".into() }).await;
        assert!(result.is_err());

        // lock must be free for the next caller
        assert!(state.cache.acquire_lock("summarize", "2", Duration::from_secs(30)).await);
    }
}
