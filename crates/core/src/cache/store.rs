//! Backing store abstraction.
//!
//! One entry point, two variants behind enum dispatch:
//!
//! - `Shared` wraps Redis; entries and locks are visible across processes.
//! - `Local` is a process-private map, used when Redis is not configured or
//!   does not answer the startup ping.
//!
//! The variant is chosen once by [`CacheStore::connect`] and fixed for the
//! process lifetime. Every runtime failure against the shared variant is
//! logged and mapped to the same outcome as absence; a backing-store problem
//! must never surface as a caller-visible error, the worst case is a
//! redundant computation.

use super::memory::MemoryStore;
use super::shared::RedisStore;
use std::time::Duration;

/// Key/value store holding cache entries and lock records.
#[derive(Debug)]
pub enum CacheStore {
    Shared(RedisStore),
    Local(MemoryStore),
}

impl CacheStore {
    /// Select the store variant for this process.
    ///
    /// Probes the Redis server with a ping when a URL is given; on any
    /// failure the process permanently falls back to the local variant.
    /// Fail open, not fail fatal: single-process correctness is preserved,
    /// cross-process sharing is lost.
    pub async fn connect(redis_url: Option<&str>) -> Self {
        match redis_url {
            Some(url) => match RedisStore::connect(url).await {
                Ok(store) => {
                    tracing::info!("query cache backed by shared redis store");
                    CacheStore::Shared(store)
                }
                Err(e) => {
                    tracing::warn!("redis unreachable ({e}), falling back to in-process cache");
                    CacheStore::local()
                }
            },
            None => {
                tracing::info!("no redis url configured, using in-process cache");
                CacheStore::local()
            }
        }
    }

    /// Construct the process-local variant directly.
    pub fn local() -> Self {
        CacheStore::Local(MemoryStore::default())
    }

    /// Whether entries written here are visible to other processes.
    pub fn is_shared(&self) -> bool {
        matches!(self, CacheStore::Shared(_))
    }

    pub async fn read(&self, key: &str) -> Option<String> {
        match self {
            CacheStore::Shared(store) => store.read(key).await.unwrap_or_else(|e| {
                tracing::warn!("cache read failed for {key}: {e}");
                None
            }),
            CacheStore::Local(store) => store.read(key),
        }
    }

    pub async fn write(&self, key: &str, value: &str, ttl: Duration) {
        match self {
            CacheStore::Shared(store) => {
                if let Err(e) = store.write(key, value, ttl).await {
                    tracing::warn!("cache write failed for {key}: {e}");
                }
            }
            CacheStore::Local(store) => store.write(key, value, ttl),
        }
    }

    pub async fn delete(&self, key: &str) {
        match self {
            CacheStore::Shared(store) => {
                if let Err(e) = store.delete(key).await {
                    tracing::warn!("cache delete failed for {key}: {e}");
                }
            }
            CacheStore::Local(store) => store.delete(key),
        }
    }

    /// Atomic set-if-absent with expiry. A shared-store error reads as "not
    /// created": the caller simply does not own the computation.
    pub async fn try_create(&self, key: &str, ttl: Duration) -> bool {
        match self {
            CacheStore::Shared(store) => store.try_create(key, ttl).await.unwrap_or_else(|e| {
                tracing::warn!("lock acquisition failed for {key}: {e}");
                false
            }),
            CacheStore::Local(store) => store.try_create(key, ttl),
        }
    }

    /// Count keys under `prefix`, skipping lock records (keys ending in
    /// `lock_suffix`). Best-effort: a shared-store failure reads as 0.
    pub async fn count_entries(&self, prefix: &str, lock_suffix: &str) -> usize {
        match self {
            CacheStore::Shared(store) => match store.keys_with_prefix(prefix).await {
                Ok(keys) => keys.iter().filter(|k| !k.ends_with(lock_suffix)).count(),
                Err(e) => {
                    tracing::warn!("cache count failed: {e}");
                    0
                }
            },
            CacheStore::Local(store) => store.count_prefix_excluding(prefix, lock_suffix),
        }
    }

    pub async fn clear_prefix(&self, prefix: &str) {
        match self {
            CacheStore::Shared(store) => {
                match store.keys_with_prefix(prefix).await {
                    Ok(keys) => {
                        if let Err(e) = store.delete_all(keys).await {
                            tracing::warn!("cache clear failed: {e}");
                        }
                    }
                    Err(e) => tracing::warn!("cache clear failed: {e}"),
                };
            }
            CacheStore::Local(store) => store.clear_prefix(prefix),
        }
    }
}
