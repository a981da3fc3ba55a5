//! Vector store retrieval.
//!
//! The corpus is a chaptered textbook embedded into a Pinecone-style index.
//! Each stored chunk carries a `type` (content or revision) plus chapter
//! identifiers; retrieval scopes similarity search with metadata filters
//! built in [`filter`].
//!
//! Orchestration code depends only on the [`VectorSearch`] trait; the
//! Pinecone implementation lives in [`pinecone`].

pub mod filter;
pub mod pinecone;

pub use pinecone::{PineconeConfig, PineconeStore};

use crate::llm::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A retrieved document chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocMetadata,
}

/// Metadata stored alongside each chunk at ingestion time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocMetadata {
    /// "content" or "revision".
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,
    /// Chapter or sub-chapter, e.g. "3" or "3.2".
    #[serde(default)]
    pub chapter: Option<String>,
    /// Major chapter, e.g. "3".
    #[serde(default)]
    pub chapter_root: Option<String>,
}

/// Errors from the vector store client.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Missing Pinecone API key.
    #[error("missing API key: PINECONE_API_KEY not set")]
    MissingApiKey,

    /// Missing index host.
    #[error("missing index host")]
    MissingIndexHost,

    /// Query embedding failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),

    /// HTTP error response from the index.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { RetrievalError::Timeout } else { RetrievalError::Network(Arc::new(err)) }
    }
}

/// Similarity search over the textbook corpus.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Return up to `k` chunks most similar to `query`, restricted by the
    /// optional metadata `filter`.
    async fn search(
        &self, query: &str, filter: Option<serde_json::Value>, k: usize,
    ) -> Result<Vec<Document>, RetrievalError>;
}
