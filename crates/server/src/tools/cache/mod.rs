//! Cache-related MCP tools.
//!
//! Operational tools over the query cache namespace.

pub mod clear;
pub mod stats;

pub use clear::{CacheClearOutput, clear_impl};
pub use stats::{CacheStatsOutput, stats_impl};
