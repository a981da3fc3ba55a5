//! Unified error types for the somo tutor service.
//!
//! Cache-internal failures never appear here: the cache absorbs them into
//! miss/no-op semantics. These variants cover caller mistakes and failures
//! of the upstream retrieval and completion collaborators, which do
//! propagate (after any held lock has been released).

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the somo tutor server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty chapter).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Vector store retrieval failed.
    #[error("RETRIEVAL_FAILED: {0}")]
    Retrieval(String),

    /// LLM completion failed.
    #[error("COMPLETION_FAILED: {0}")]
    Completion(String),

    /// LLM API authentication error.
    #[error("LLM_AUTH_ERROR: {0}")]
    LlmAuth(String),

    /// LLM API rate limited.
    #[error("LLM_RATE_LIMITED: {0}")]
    LlmRateLimited(String),

    /// Upstream request timed out.
    #[error("UPSTREAM_TIMEOUT: {0}")]
    Timeout(String),

    /// A response payload could not be serialized.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(String),
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Retrieval(msg) => (-32000, msg.clone()),
            Error::Completion(msg) => (-32001, msg.clone()),
            Error::LlmAuth(msg) => (-32002, msg.clone()),
            Error::LlmRateLimited(msg) => (-32003, msg.clone()),
            Error::Timeout(msg) => (-32004, msg.clone()),
            Error::Serialize(msg) => (-32005, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
