//! revision tool implementation.
//!
//! Builds a bilingual answer sheet for a chapter's end-of-chapter revision
//! questions. Revision chunks live under the "<major>.5" section of each
//! chapter in the corpus; questions extracted from them are answered
//! concurrently, each against its own small retrieval, under a semaphore
//! that bounds upstream pressure.

use crate::state::ServerState;
use crate::tools::{json_result, llm_error, retrieval_error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use somo_client::{
    Document, clean_question_text, extract_revision_questions, parse_bilingual, prompt, retrieval::filter,
};
use somo_core::{Error, RevisionAnswer};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cache operation name for revision answer sheets.
const OP: &str = "revision";

/// Revision chunks retrieved per chapter.
const REVISION_K: usize = 300;

/// Content chunks retrieved for fallback context.
const CONTENT_K: usize = 300;

/// Content chunks retrieved per individual question.
const PER_QUESTION_K: usize = 4;

/// Parameters for the revision tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RevisionParams {
    /// Chapter whose revision questions to answer, e.g. "3" or "3.2".
    pub chapter: String,
}

/// Output from the revision tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RevisionOutput {
    /// Always "revision".
    pub mode: String,
    /// Chapter the answer sheet covers.
    pub chapter: String,
    /// Number of questions answered.
    pub question_count: usize,
    /// Answers in textbook order.
    pub answers: Vec<RevisionAnswer>,
    /// RFC 3339 timestamp of when this response was produced.
    pub generated_at: String,
    /// Whether the response came from the cache.
    pub cache_hit: bool,
}

fn output(chapter: &str, answers: Vec<RevisionAnswer>, cache_hit: bool) -> RevisionOutput {
    RevisionOutput {
        mode: "revision".to_string(),
        chapter: chapter.to_string(),
        question_count: answers.len(),
        answers,
        generated_at: chrono::Utc::now().to_rfc3339(),
        cache_hit,
    }
}

/// Implementation of the revision tool.
pub async fn revision_impl(state: &ServerState, params: RevisionParams) -> Result<CallToolResult, McpError> {
    let chapter = params.chapter.trim().to_string();
    if chapter.is_empty() {
        return Err(Error::InvalidInput("chapter cannot be empty".into()).into());
    }

    if let Some(answers) = state.cache.get::<Vec<RevisionAnswer>>(OP, &chapter).await {
        tracing::info!("revision cache hit for chapter {chapter}");
        return json_result(&output(&chapter, answers, true));
    }

    // revision sheets answer many questions; the lock lives longer than
    // the single-completion tools
    let owns_lock = state
        .cache
        .acquire_lock(OP, &chapter, state.config.revision_lock_ttl())
        .await;
    if !owns_lock
        && let Some(answers) = state.cache.wait_for::<Vec<RevisionAnswer>>(OP, &chapter).await
    {
        return json_result(&output(&chapter, answers, true));
    }

    match compute_revision(state, &chapter).await {
        Ok(answers) => {
            // an empty sheet is cached too, so chapters without revision
            // sections do not re-trigger retrieval every request
            state.cache.set(&answers, OP, &chapter).await;
            json_result(&output(&chapter, answers, false))
        }
        Err(e) => {
            if owns_lock {
                state.cache.release_lock(OP, &chapter).await;
            }
            Err(e.into())
        }
    }
}

async fn compute_revision(state: &ServerState, chapter: &str) -> Result<Vec<RevisionAnswer>, Error> {
    let revision_docs = fetch_revision_docs(state, chapter).await?;
    let questions = prepare_questions(&revision_docs);
    if questions.is_empty() {
        tracing::warn!("no revision questions found for chapter {chapter}");
        return Ok(Vec::new());
    }
    tracing::info!("answering {} revision questions for chapter {chapter}", questions.len());

    let content_docs = fetch_content_docs(state, chapter).await?;
    let fallback_context = prompt::stuff_documents(&content_docs[..content_docs.len().min(PER_QUESTION_K)]);

    let semaphore = Arc::new(Semaphore::new(state.config.max_concurrent_questions));
    let mut set: JoinSet<(usize, Option<RevisionAnswer>)> = JoinSet::new();

    for (idx, question) in questions.iter().enumerate() {
        let semaphore = semaphore.clone();
        let docs = state.docs.clone();
        let llm = state.llm.clone();
        let chapter = chapter.to_string();
        let question = question.clone();
        let fallback = fallback_context.clone();

        set.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (idx, None),
            };

            let context = match docs
                .search(&question, Some(filter::type_filter("content")), PER_QUESTION_K)
                .await
            {
                Ok(found) if !found.is_empty() => prompt::stuff_documents(&found),
                Ok(_) => fallback,
                Err(e) => {
                    tracing::warn!("per-question retrieval failed, using chapter context: {e}");
                    fallback
                }
            };

            let full_prompt = prompt::answer_prompt(&chapter, &context, &question);
            match llm.complete(&full_prompt).await {
                Ok(raw) => {
                    let answer = RevisionAnswer { question_text: question, answer: parse_bilingual(&raw) };
                    (idx, Some(answer))
                }
                Err(e) => {
                    tracing::warn!("revision answer failed for question {idx}: {e}");
                    (idx, None)
                }
            }
        });
    }

    let mut slots: Vec<Option<RevisionAnswer>> = vec![None; questions.len()];
    while let Some(joined) = set.join_next().await {
        if let Ok((idx, answer)) = joined {
            slots[idx] = answer;
        }
    }

    let answers: Vec<RevisionAnswer> = slots.into_iter().flatten().collect();
    if answers.is_empty() {
        return Err(Error::Completion("every revision answer failed".into()));
    }
    Ok(answers)
}

/// Revision chunks for the chapter's "<major>.5" revision section, with a
/// prefix scan over all revision chunks when the exact section is missing.
async fn fetch_revision_docs(state: &ServerState, chapter: &str) -> Result<Vec<Document>, Error> {
    let root = filter::chapter_root(chapter);
    let revision_section = format!("{root}.5");

    let docs = state
        .docs
        .search(
            "revision questions",
            Some(filter::exact_chapter_filter("revision", &revision_section)),
            REVISION_K,
        )
        .await
        .map_err(retrieval_error)?;
    if !docs.is_empty() {
        return Ok(docs);
    }

    tracing::debug!("no chunks under section {revision_section}, scanning all revision chunks");
    let all = state
        .docs
        .search("revision questions", Some(filter::type_filter("revision")), REVISION_K)
        .await
        .map_err(retrieval_error)?;

    Ok(all
        .into_iter()
        .filter(|d| {
            d.metadata
                .chapter
                .as_deref()
                .is_some_and(|c| filter::chapter_root(c) == root)
        })
        .collect())
}

/// Content chunks giving fallback context, by major chapter first.
async fn fetch_content_docs(state: &ServerState, chapter: &str) -> Result<Vec<Document>, Error> {
    let docs = state
        .docs
        .search(
            "chapter content",
            Some(filter::chapter_root_filter("content", chapter)),
            CONTENT_K,
        )
        .await
        .map_err(retrieval_error)?;
    if !docs.is_empty() {
        return Ok(docs);
    }

    state
        .docs
        .search("chapter content", Some(filter::chapter_filter("content", chapter)), 200)
        .await
        .map_err(retrieval_error)
}

/// Extract, normalize and dedup questions from revision chunks.
fn prepare_questions(docs: &[Document]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut questions = Vec::new();

    for raw in extract_revision_questions(docs) {
        let cleaned = clean_question_text(&raw);
        let lower = cleaned.to_lowercase();
        if cleaned.chars().count() < 6
            || lower.starts_with("index")
            || lower.starts_with("chapter")
            || lower.starts_with("--- page")
        {
            continue;
        }
        if seen.insert(cleaned.clone()) {
            questions.push(cleaned);
        }
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeDocs, FakeLlm, content_doc, test_state};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    const REPLY: &str = "ENGLISH:\nDiffusion spreads particles.\n\nSWAHILI:\nMtawanyiko husambaza chembe.";

    fn revision_docs() -> Vec<Document> {
        vec![
            content_doc("What is diffusion and why is it important to cells?", "3.5"),
            content_doc("Index of diagrams", "3.5"),
            content_doc("Explain how osmosis differs from diffusion in plant cells", "3.5"),
        ]
    }

    #[tokio::test]
    async fn test_empty_chapter_rejected() {
        let state = test_state(Arc::new(FakeDocs::new(vec![])), Arc::new(FakeLlm::new(REPLY)));
        let result = revision_impl(&state, RevisionParams { chapter: "".into() }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_answers_every_question_in_order() {
        let llm = Arc::new(FakeLlm::new(REPLY));
        let state = test_state(Arc::new(FakeDocs::new(revision_docs())), llm.clone());

        let result = revision_impl(&state, RevisionParams { chapter: "3".into() }).await;
        assert!(result.is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);

        let cached: Vec<RevisionAnswer> = state.cache.get("revision", "3").await.unwrap();
        assert_eq!(cached.len(), 2);
        assert!(cached[0].question_text.starts_with("What is diffusion"));
        assert!(cached[1].question_text.starts_with("Explain how osmosis"));
    }

    #[tokio::test]
    async fn test_no_questions_caches_empty_sheet() {
        let docs = Arc::new(FakeDocs::new(vec![content_doc("Introduction", "3.5")]));
        let llm = Arc::new(FakeLlm::new(REPLY));
        let state = test_state(docs.clone(), llm.clone());

        let result = revision_impl(&state, RevisionParams { chapter: "3".into() }).await;
        assert!(result.is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

        let searches_after_first = docs.calls.load(Ordering::SeqCst);
        let result = revision_impl(&state, RevisionParams { chapter: "3".into() }).await;
        assert!(result.is_ok());
        assert_eq!(docs.calls.load(Ordering::SeqCst), searches_after_first, "second call must not search");
    }

    #[tokio::test]
    async fn test_cached_sheet_served_without_llm() {
        let llm = Arc::new(FakeLlm::new(REPLY));
        let state = test_state(Arc::new(FakeDocs::new(revision_docs())), llm.clone());

        assert!(revision_impl(&state, RevisionParams { chapter: "3".into() }).await.is_ok());
        let calls_after_first = llm.calls.load(Ordering::SeqCst);

        assert!(revision_impl(&state, RevisionParams { chapter: "3".into() }).await.is_ok());
        assert_eq!(llm.calls.load(Ordering::SeqCst), calls_after_first);
    }

    #[test]
    fn test_prepare_questions_cleans_and_dedups() {
        let docs = vec![
            content_doc("--- page --- What is digestion?", "1.5"),
            content_doc("What is digestion?", "1.5"),
            content_doc("The cell", "1.5"),
        ];
        let questions = prepare_questions(&docs);
        assert_eq!(questions, vec!["What is digestion?".to_string()]);
    }
}
