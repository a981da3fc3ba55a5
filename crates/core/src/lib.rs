//! Core types and shared functionality for the somo tutor service.
//!
//! This crate provides:
//! - Query cache with Redis/in-process backends and request coalescing
//! - Bilingual answer payload types
//! - Unified error types
//! - Configuration structures

pub mod answer;
pub mod cache;
pub mod config;
pub mod error;

pub use answer::{BilingualAnswer, RevisionAnswer};
pub use cache::{CacheStore, CacheTuning, QueryCache};
pub use config::AppConfig;
pub use error::Error;
