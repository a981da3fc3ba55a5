//! Upstream clients and text processing for the bilingual tutor.
//!
//! This crate owns everything between the tool layer and the outside
//! world: the OpenAI chat and embedding clients, the Pinecone vector
//! search client with its metadata filter builders, prompt construction,
//! bilingual output parsing, and revision question extraction.

pub mod bilingual;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod revision;
pub mod tokens;

pub use bilingual::{SWAHILI_UNAVAILABLE, clean_question_text, parse_bilingual};
pub use llm::{Completion, EmbeddingClient, LlmConfig, LlmError, OpenAiClient};
pub use retrieval::{DocMetadata, Document, PineconeConfig, PineconeStore, RetrievalError, VectorSearch};
pub use revision::extract_revision_questions;
pub use tokens::estimate_tokens;
