//! LLM API client error types.

use std::sync::Arc;

/// Errors from the OpenAI-compatible completion/embedding client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Missing API key.
    #[error("missing API key: OPENAI_API_KEY not set")]
    MissingApiKey,

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
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

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { LlmError::Timeout } else { LlmError::Network(Arc::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LlmError::MissingApiKey;
        assert!(err.to_string().contains("API key"));

        let err = LlmError::HttpError { status: 503 };
        assert!(err.to_string().contains("503"));
    }
}
