//! Query cache with request coalescing in front of LLM and retrieval calls.
//!
//! The cache prefers a shared Redis store (entries survive restarts and are
//! visible to every worker) and degrades to a process-local map when Redis
//! is absent or unreachable. A short-lived per-key lock built on atomic
//! set-if-absent keeps concurrent identical requests from triggering
//! duplicate completions:
//!
//! - SHA-256 keys derived from `(operation, query)` tuples
//! - single configurable TTL for all entries, lazy expiry on the local store
//! - bounded poll-wait for callers that lose the lock race
//! - fail-soft store access: backing-store errors read as cache misses

pub mod key;
pub mod memory;
pub mod query;
pub mod shared;
pub mod store;

pub use query::{CacheTuning, QueryCache};
pub use store::CacheStore;
