//! Query cache with request coalescing.
//!
//! Composes the key hasher, the backing store, and a per-key lock into the
//! contract orchestration code programs against. Per key the cache moves
//! through three states:
//!
//! ```text
//! ABSENT --acquire_lock--> COMPUTING --set--> PRESENT --ttl/clear--> ABSENT
//!                              |
//!                              +--lock ttl expires--> ABSENT
//! ```
//!
//! The intended call sequence for an orchestration function:
//!
//! 1. `get` — return on hit.
//! 2. `acquire_lock` — the winner computes, publishes with `set`, and
//!    releases on every exit path.
//! 3. Losers call `wait_for`, a bounded non-busy poll; when the wait window
//!    elapses they compute independently rather than block forever.
//!
//! Two callers may therefore both compute after a wait timeout; `set` is
//! last-writer-wins over idempotent payloads, so the duplicate work costs
//! latency, never correctness.

use super::key;
use super::store::CacheStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::Instant;

/// Timing knobs for the cache, derived from `AppConfig` in production.
#[derive(Debug, Clone, Copy)]
pub struct CacheTuning {
    /// How long a published entry stays visible.
    pub ttl: Duration,
    /// Interval between polls while waiting on another caller's computation.
    pub poll_interval: Duration,
    /// Upper bound on how long a losing acquirer defers to the lock owner.
    pub wait_timeout: Duration,
}

impl Default for CacheTuning {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            poll_interval: Duration::from_millis(500),
            wait_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared cache for expensive query results.
///
/// Constructed once at process start and injected into every orchestration
/// function; the TTL and backing-store choice are visible configuration, not
/// ambient state. The cache itself spawns nothing; all concurrency lives at
/// the caller level plus whatever the backing store provides.
#[derive(Debug)]
pub struct QueryCache {
    store: CacheStore,
    tuning: CacheTuning,
}

impl QueryCache {
    pub fn new(store: CacheStore, tuning: CacheTuning) -> Self {
        Self { store, tuning }
    }

    /// Entry TTL shared by all entries.
    pub fn ttl(&self) -> Duration {
        self.tuning.ttl
    }

    /// Whether cached entries are visible to other worker processes.
    pub fn is_shared(&self) -> bool {
        self.store.is_shared()
    }

    /// Read the cached value for `(op, query)`, if present and fresh.
    ///
    /// An entry that fails to decode is treated as a miss so one corrupted
    /// record cannot break a request.
    pub async fn get<T: DeserializeOwned>(&self, op: &str, query: &str) -> Option<T> {
        let cache_key = key::cache_key(op, query);
        let raw = self.store.read(&cache_key).await?;
        decode(&raw)
    }

    /// Poll for the value while another caller holds the computation lock.
    ///
    /// Returns the value as soon as it appears. Returns `None` early when
    /// the lock disappears without a publication (owner crashed or declined
    /// to cache) or once `wait_timeout` elapses; in both cases the caller
    /// should proceed to compute on its own.
    pub async fn wait_for<T: DeserializeOwned>(&self, op: &str, query: &str) -> Option<T> {
        let cache_key = key::cache_key(op, query);
        let lock_key = key::lock_key(&cache_key);
        let deadline = Instant::now() + self.tuning.wait_timeout;

        loop {
            // sample the lock before the entry: `set` publishes the entry
            // before deleting the lock, so lock-gone plus entry-absent can
            // only mean the owner gave up without publishing
            let lock_held = self.store.read(&lock_key).await.is_some();
            if let Some(raw) = self.store.read(&cache_key).await {
                return decode(&raw);
            }
            if !lock_held {
                tracing::debug!("lock for {op} gone without a result, caller will compute");
                return None;
            }
            if Instant::now() >= deadline {
                tracing::debug!("wait window elapsed for {op}, caller will compute");
                return None;
            }
            tokio::time::sleep(self.tuning.poll_interval).await;
        }
    }

    /// Publish a computed result and clear the coalescing lock, signalling
    /// any pollers. Last writer wins. Empty results are cached like any
    /// other value so repeated misses do not re-trigger the computation.
    pub async fn set<T: Serialize>(&self, value: &T, op: &str, query: &str) {
        let cache_key = key::cache_key(op, query);
        match serde_json::to_string(value) {
            Ok(raw) => self.store.write(&cache_key, &raw, self.tuning.ttl).await,
            Err(e) => {
                tracing::warn!("failed to encode cache entry for {op}: {e}");
                return;
            }
        }
        self.store.delete(&key::lock_key(&cache_key)).await;
    }

    /// Try to take responsibility for computing `(op, query)`.
    ///
    /// True means this caller owns the computation and must publish via
    /// [`set`](Self::set) or call [`release_lock`](Self::release_lock) on
    /// failure. The lock self-expires after `lock_ttl`, which bounds how
    /// long a crashed owner can block others.
    pub async fn acquire_lock(&self, op: &str, query: &str, lock_ttl: Duration) -> bool {
        let lock_key = key::lock_key(&key::cache_key(op, query));
        self.store.try_create(&lock_key, lock_ttl).await
    }

    /// Drop the lock for `(op, query)` unconditionally.
    pub async fn release_lock(&self, op: &str, query: &str) {
        let lock_key = key::lock_key(&key::cache_key(op, query));
        self.store.delete(&lock_key).await;
    }

    /// Remove every entry and lock under this cache's namespace.
    pub async fn clear(&self) {
        self.store.clear_prefix(key::KEY_PREFIX).await;
    }

    /// Number of cached entries (locks excluded). Best-effort under the
    /// shared variant.
    pub async fn count(&self) -> usize {
        self.store.count_entries(key::KEY_PREFIX, key::LOCK_SUFFIX).await
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("undecodable cache entry treated as miss: {e}");
            None
        }
    }
}
