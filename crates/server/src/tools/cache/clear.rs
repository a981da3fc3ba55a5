//! cache_clear tool implementation.

use crate::tools::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use somo_core::QueryCache;

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    /// Always "cache cleared".
    pub status: String,
}

/// Implementation of the cache_clear tool. Removes every cached result and
/// coalescing lock in the namespace; in-flight computations will publish
/// fresh entries when they finish.
pub async fn clear_impl(cache: &QueryCache) -> Result<CallToolResult, McpError> {
    cache.clear().await;
    tracing::info!("query cache cleared");
    json_result(&CacheClearOutput { status: "cache cleared".to_string() })
}
