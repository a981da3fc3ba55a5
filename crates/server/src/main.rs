//! somo-tutor server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use somo_client::{EmbeddingClient, LlmConfig, OpenAiClient, PineconeConfig, PineconeStore};
use somo_core::{AppConfig, CacheStore, QueryCache};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!("Starting somo-tutor server on stdio transport");

    let store = CacheStore::connect(config.redis_url.as_deref()).await;
    let cache = QueryCache::new(store, config.cache_tuning());

    let llm_config = LlmConfig {
        api_key: config.require_openai_api_key()?.to_string(),
        base_url: config.openai_base_url.clone(),
        model: config.chat_model.clone(),
        embedding_model: config.embedding_model.clone(),
        timeout: config.timeout(),
        user_agent: config.user_agent.clone(),
        ..Default::default()
    };
    let llm = OpenAiClient::new(llm_config.clone())?;
    let embedder = EmbeddingClient::new(llm_config)?;

    let pinecone_config = PineconeConfig {
        api_key: config.require_pinecone_api_key()?.to_string(),
        index_host: config.require_pinecone_index_host()?.to_string(),
        namespace: config.pinecone_namespace.clone(),
        user_agent: config.user_agent.clone(),
        ..Default::default()
    };
    let docs = PineconeStore::new(pinecone_config, embedder)?;

    let state = state::ServerState { cache: Arc::new(cache), docs: Arc::new(docs), llm: Arc::new(llm), config };

    let handler = handler::SomoTutorServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
