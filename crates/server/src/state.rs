//! Shared state handed to every tool implementation.

use somo_client::{Completion, VectorSearch};
use somo_core::{AppConfig, QueryCache};
use std::sync::Arc;

/// Collaborators built once at startup.
///
/// Retrieval and completion sit behind traits so tests can substitute fakes
/// and count upstream invocations.
#[derive(Clone)]
pub struct ServerState {
    pub cache: Arc<QueryCache>,
    pub docs: Arc<dyn VectorSearch>,
    pub llm: Arc<dyn Completion>,
    pub config: AppConfig,
}
