//! Pinecone index client.
//!
//! Implements [`VectorSearch`] against the Pinecone data-plane REST API:
//! the query text is embedded first, then `/query` is called with the
//! vector, a `topK`, and the metadata filter. Chunk text is stored in the
//! `page_content` metadata field at ingestion time; matches without it are
//! skipped.

use super::{DocMetadata, Document, RetrievalError, VectorSearch};
use crate::llm::EmbeddingClient;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Default request timeout against the index.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Pinecone client configuration.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// API key sent in the `Api-Key` header.
    pub api_key: String,
    /// Index host, e.g. `https://myindex-abc123.svc.pinecone.io`.
    pub index_host: String,
    /// Optional namespace scoping all queries.
    pub namespace: Option<String>,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_host: String::new(),
            namespace: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: "somo-tutor/0.1".to_string(),
        }
    }
}

/// Pinecone-backed [`VectorSearch`] implementation.
#[derive(Debug, Clone)]
pub struct PineconeStore {
    http: reqwest::Client,
    config: PineconeConfig,
    embedder: EmbeddingClient,
}

impl PineconeStore {
    pub fn new(config: PineconeConfig, embedder: EmbeddingClient) -> Result<Self, RetrievalError> {
        if config.api_key.is_empty() {
            return Err(RetrievalError::MissingApiKey);
        }
        if config.index_host.is_empty() {
            return Err(RetrievalError::MissingIndexHost);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RetrievalError::Network(std::sync::Arc::new(e)))?;

        Ok(Self { http, config, embedder })
    }
}

#[async_trait]
impl VectorSearch for PineconeStore {
    async fn search(
        &self, query: &str, filter: Option<serde_json::Value>, k: usize,
    ) -> Result<Vec<Document>, RetrievalError> {
        let vector = self.embedder.embed(query).await?;

        let mut body = json!({
            "vector": vector,
            "topK": k,
            "includeMetadata": true,
        });
        if let Some(filter) = filter {
            body["filter"] = filter;
        }
        if let Some(namespace) = &self.config.namespace {
            body["namespace"] = json!(namespace);
        }

        let url = format!("{}/query", self.config.index_host);
        tracing::debug!("querying index: k={k}");

        let http_response = self
            .http
            .post(&url)
            .header("Api-Key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(RetrievalError::from)?;

        let status = http_response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(RetrievalError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await.map_err(RetrievalError::from)?;
        let response: QueryResponse =
            serde_json::from_slice(&bytes).map_err(|e| RetrievalError::Parse(e.to_string()))?;

        let documents = response
            .matches
            .into_iter()
            .filter_map(|m| m.into_document())
            .collect::<Vec<_>>();

        tracing::debug!("index returned {} usable chunks", documents.len());
        Ok(documents)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct MatchMetadata {
    #[serde(default)]
    page_content: Option<String>,
    #[serde(rename = "type", default)]
    doc_type: Option<String>,
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    chapter_root: Option<String>,
}

impl QueryMatch {
    fn into_document(self) -> Option<Document> {
        let metadata = self.metadata?;
        let content = metadata.page_content?;
        Some(Document {
            content,
            metadata: DocMetadata {
                doc_type: metadata.doc_type,
                chapter: metadata.chapter,
                chapter_root: metadata.chapter_root,
            },
        })
    }
}
