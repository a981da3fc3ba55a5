//! OpenAI-compatible completion and embedding clients.
//!
//! Latency on the completions endpoint is unbounded and variable; callers
//! are expected to sit behind the query cache rather than call this
//! directly per request.
//!
//! ### Wire contract
//!
//! - **Endpoints**: `{base_url}/chat/completions`, `{base_url}/embeddings`
//! - **Authentication**: `Authorization: Bearer <key>` header.
//! - **Normalization**: first-choice message text, mapped error taxonomy
//!   (auth, rate limit, timeout, HTTP status).

pub mod error;
pub mod request;
pub mod response;

pub use error::LlmError;

use async_trait::async_trait;
use request::{ChatMessage, ChatRequest, EmbeddingRequest};
use response::{ChatResponse, EmbeddingResponse};
use std::time::{Duration, Instant};

/// Default base URL for the OpenAI API.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default chat model.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Sampling temperature for tutoring answers.
const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Completion length cap.
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// LLM client configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key.
    pub api_key: String,
    /// Base URL (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Chat model name.
    pub model: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Request timeout (default: 60s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            user_agent: "somo-tutor/0.1".to_string(),
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads OPENAI_API_KEY from environment. Returns error if not set.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| LlmError::MissingApiKey)?;

        Ok(Self { api_key, ..Default::default() })
    }
}

/// The expensive completion capability orchestration functions depend on.
///
/// Behind a trait so tests can substitute a fake and count invocations.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Complete `prompt` and return the raw model output.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// OpenAI chat completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LlmError::Network(std::sync::Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Create a new client from environment variables.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(LlmConfig::from_env()?)
    }

    async fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<bytes::Bytes, LlmError> {
        let url = format!("{}{path}", self.config.base_url);

        let http_response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = http_response.status();
        tracing::debug!("llm api response status: {status}");

        if status == 401 || status == 403 {
            return Err(LlmError::AuthError);
        }
        if status == 429 {
            return Err(LlmError::RateLimited);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(LlmError::HttpError { status: status.as_u16() });
        }

        http_response.bytes().await.map_err(LlmError::from)
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let start = Instant::now();
        let bytes = self.post_json("/chat/completions", &request).await?;

        let response: ChatResponse = serde_json::from_slice(&bytes).map_err(|e| LlmError::Parse(e.to_string()))?;

        tracing::debug!("completion finished in {:?}", start.elapsed());

        response
            .text()
            .map(|t| t.to_string())
            .ok_or_else(|| LlmError::Parse("empty completion".to_string()))
    }
}

/// OpenAI embeddings client used to vectorize retrieval queries.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl EmbeddingClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LlmError::Network(std::sync::Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Embed one text, returning its vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = EmbeddingRequest { model: self.config.embedding_model.clone(), input: vec![text.to_string()] };

        let url = format!("{}/embeddings", self.config.base_url);
        let http_response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = http_response.status();
        if status == 401 || status == 403 {
            return Err(LlmError::AuthError);
        }
        if status == 429 {
            return Err(LlmError::RateLimited);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(LlmError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await.map_err(LlmError::from)?;
        let response: EmbeddingResponse =
            serde_json::from_slice(&bytes).map_err(|e| LlmError::Parse(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| LlmError::Parse("empty embedding response".to_string()))
    }
}
