//! ask tool implementation.
//!
//! Answers one free-form question against the textbook corpus with a small
//! top-k retrieval, optionally scoped to a chapter.

use crate::state::ServerState;
use crate::tools::{json_result, llm_error, retrieval_error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use somo_client::{parse_bilingual, prompt, retrieval::filter};
use somo_core::{BilingualAnswer, Error};

/// Cache operation name for direct questions.
const OP: &str = "ask";

/// Chunks retrieved per question.
const RETRIEVAL_K: usize = 4;

/// Parameters for the ask tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AskParams {
    /// The question to answer.
    pub question: String,

    /// Optional chapter scope, e.g. "3" or "3.2". Unscoped questions
    /// search the whole corpus.
    #[serde(default)]
    pub chapter: Option<String>,
}

/// Output from the ask tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AskOutput {
    /// Always "answer".
    pub mode: String,
    /// The question as asked.
    pub question: String,
    /// Chapter scope, if any.
    pub chapter: Option<String>,
    /// Bilingual answer text.
    pub response: BilingualAnswer,
    /// RFC 3339 timestamp of when this response was produced.
    pub generated_at: String,
    /// Whether the response came from the cache.
    pub cache_hit: bool,
}

fn output(question: &str, chapter: Option<&str>, response: BilingualAnswer, cache_hit: bool) -> AskOutput {
    AskOutput {
        mode: "answer".to_string(),
        question: question.to_string(),
        chapter: chapter.map(|c| c.to_string()),
        response,
        generated_at: chrono::Utc::now().to_rfc3339(),
        cache_hit,
    }
}

/// Implementation of the ask tool.
pub async fn ask_impl(state: &ServerState, params: AskParams) -> Result<CallToolResult, McpError> {
    let question = params.question.trim().to_string();
    if question.is_empty() {
        return Err(Error::InvalidInput("question cannot be empty".into()).into());
    }
    let chapter = params
        .chapter
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    // chapter scope participates in the key so "3"-scoped and unscoped
    // variants of one question cache separately; the unit separator can
    // never appear in a trimmed chapter id, so a question that literally
    // starts with "3|" cannot alias the chapter-3 scope
    let cache_query = match chapter {
        Some(chapter) => format!("{chapter}\u{1f}{question}"),
        None => question.clone(),
    };

    if let Some(answer) = state.cache.get::<BilingualAnswer>(OP, &cache_query).await {
        tracing::info!("answer cache hit");
        return json_result(&output(&question, chapter, answer, true));
    }

    let owns_lock = state.cache.acquire_lock(OP, &cache_query, state.config.lock_ttl()).await;
    if !owns_lock
        && let Some(answer) = state.cache.wait_for::<BilingualAnswer>(OP, &cache_query).await
    {
        return json_result(&output(&question, chapter, answer, true));
    }

    match compute_answer(state, &question, chapter).await {
        Ok(answer) => {
            state.cache.set(&answer, OP, &cache_query).await;
            json_result(&output(&question, chapter, answer, false))
        }
        Err(e) => {
            if owns_lock {
                state.cache.release_lock(OP, &cache_query).await;
            }
            Err(e.into())
        }
    }
}

async fn compute_answer(state: &ServerState, question: &str, chapter: Option<&str>) -> Result<BilingualAnswer, Error> {
    let search_filter = match chapter {
        Some(chapter) => filter::chapter_filter("content", chapter),
        None => filter::type_filter("content"),
    };

    let docs = state
        .docs
        .search(question, Some(search_filter), RETRIEVAL_K)
        .await
        .map_err(retrieval_error)?;

    if docs.is_empty() {
        return Err(Error::Retrieval(format!("no relevant content found for question: {question}")));
    }

    let context = prompt::stuff_documents(&docs);
    let full_prompt = prompt::answer_prompt(chapter.unwrap_or("unknown"), &context, question);
    let raw = state.llm.complete(&full_prompt).await.map_err(llm_error)?;

    Ok(parse_bilingual(&raw))
}
