//! MCP tool implementations.
//!
//! Every expensive tool follows the same cached-coalesced shape: check the
//! cache, try to take the computation lock, wait on the lock holder when
//! losing the race, and publish the result. Upstream failures release any
//! held lock before propagating.

pub mod ask;
pub mod cache;
pub mod revision;
pub mod summarize;

pub use ask::{AskOutput, AskParams};
pub use revision::{RevisionOutput, RevisionParams};
pub use summarize::{SummarizeOutput, SummarizeParams};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use somo_client::{LlmError, RetrievalError};
use somo_core::Error;

/// Serialize a tool output struct into a successful text result.
pub(crate) fn json_result<T: serde::Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| Error::Serialize(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Map a completion client failure onto the unified error taxonomy.
pub(crate) fn llm_error(err: LlmError) -> Error {
    let msg = err.to_string();
    match err {
        LlmError::MissingApiKey | LlmError::AuthError => Error::LlmAuth(msg),
        LlmError::RateLimited => Error::LlmRateLimited(msg),
        LlmError::Timeout => Error::Timeout(msg),
        _ => Error::Completion(msg),
    }
}

/// Map a vector store failure onto the unified error taxonomy.
pub(crate) fn retrieval_error(err: RetrievalError) -> Error {
    match err {
        RetrievalError::Timeout => Error::Timeout(err.to_string()),
        RetrievalError::Embedding(inner) => llm_error(inner),
        other => Error::Retrieval(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::state::ServerState;
    use async_trait::async_trait;
    use somo_client::{Completion, Document, LlmError, RetrievalError, VectorSearch};
    use somo_core::{AppConfig, CacheStore, CacheTuning, QueryCache};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory corpus answering every search with its fixed documents.
    pub struct FakeDocs {
        pub docs: Vec<Document>,
        pub calls: AtomicUsize,
    }

    impl FakeDocs {
        pub fn new(docs: Vec<Document>) -> Self {
            Self { docs, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl VectorSearch for FakeDocs {
        async fn search(
            &self, _query: &str, _filter: Option<serde_json::Value>, k: usize,
        ) -> Result<Vec<Document>, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.docs.iter().take(k).cloned().collect())
        }
    }

    /// Completion fake returning a canned reply, optionally after a delay
    /// so coalescing races stay open long enough to observe.
    pub struct FakeLlm {
        pub reply: String,
        pub delay: Duration,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeLlm {
        pub fn new(reply: &str) -> Self {
            Self { reply: reply.to_string(), delay: Duration::ZERO, calls: Arc::new(AtomicUsize::new(0)) }
        }

        pub fn slow(reply: &str, delay: Duration) -> Self {
            Self { delay, ..Self::new(reply) }
        }
    }

    #[async_trait]
    impl Completion for FakeLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.reply.clone())
        }
    }

    /// Completion fake failing every call.
    pub struct FailingLlm;

    #[async_trait]
    impl Completion for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::HttpError { status: 500 })
        }
    }

    pub fn content_doc(text: &str, chapter: &str) -> Document {
        Document {
            content: text.to_string(),
            metadata: somo_client::DocMetadata {
                doc_type: Some("content".to_string()),
                chapter: Some(chapter.to_string()),
                chapter_root: Some(chapter.split('.').next().unwrap_or(chapter).to_string()),
            },
        }
    }

    pub fn test_state(docs: Arc<dyn VectorSearch>, llm: Arc<dyn Completion>) -> ServerState {
        let tuning = CacheTuning {
            ttl: Duration::from_secs(600),
            poll_interval: Duration::from_millis(10),
            wait_timeout: Duration::from_secs(5),
        };
        ServerState {
            cache: Arc::new(QueryCache::new(CacheStore::local(), tuning)),
            docs,
            llm,
            config: AppConfig::default(),
        }
    }
}
