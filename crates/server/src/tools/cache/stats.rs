//! cache_stats tool implementation.

use crate::tools::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use somo_core::QueryCache;

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsOutput {
    /// Number of cached query results (coalescing locks excluded).
    pub cached_queries: usize,
    /// Seconds a cached result stays fresh.
    pub ttl_seconds: u64,
    /// Whether the cache is shared across worker processes.
    pub shared: bool,
}

/// Implementation of the cache_stats tool.
pub async fn stats_impl(cache: &QueryCache) -> Result<CallToolResult, McpError> {
    let output = CacheStatsOutput {
        cached_queries: cache.count().await,
        ttl_seconds: cache.ttl().as_secs(),
        shared: cache.is_shared(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use somo_core::{BilingualAnswer, CacheStore, CacheTuning};

    #[tokio::test]
    async fn test_stats_counts_entries() {
        let cache = QueryCache::new(CacheStore::local(), CacheTuning::default());
        let answer = BilingualAnswer { english: "a".into(), swahili: "b".into() };
        cache.set(&answer, "summarize", "1").await;
        cache.set(&answer, "ask", "q").await;

        let result = stats_impl(&cache).await;
        assert!(result.is_ok());
        assert_eq!(cache.count().await, 2);
    }

    #[tokio::test]
    async fn test_stats_reports_local_cache() {
        let cache = QueryCache::new(CacheStore::local(), CacheTuning::default());
        assert!(!cache.is_shared());
        assert!(stats_impl(&cache).await.is_ok());
    }
}
