//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use crate::state::ServerState;
use crate::tools::ask::{AskParams, ask_impl};
use crate::tools::cache::{clear_impl, stats_impl};
use crate::tools::revision::{RevisionParams, revision_impl};
use crate::tools::summarize::{SummarizeParams, summarize_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for somo-tutor.
#[derive(Clone)]
pub struct SomoTutorServer {
    state: ServerState,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SomoTutorServer {
    /// Create a new server handler.
    pub fn new(state: ServerState) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Summarize one textbook chapter in English and Swahili.
    #[tool(description = "Generate a bilingual (English/Swahili) revision summary of a textbook chapter.")]
    async fn summarize(&self, params: Parameters<SummarizeParams>) -> Result<CallToolResult, McpError> {
        summarize_impl(&self.state, params.0).await
    }

    /// Answer every revision question at the end of a chapter.
    #[tool(description = "Answer a chapter's end-of-chapter revision questions bilingually, in textbook order.")]
    async fn revision(&self, params: Parameters<RevisionParams>) -> Result<CallToolResult, McpError> {
        revision_impl(&self.state, params.0).await
    }

    /// Answer one free-form question against the textbook.
    #[tool(description = "Answer a question from the textbook in English and Swahili, optionally scoped to a chapter.")]
    async fn ask(&self, params: Parameters<AskParams>) -> Result<CallToolResult, McpError> {
        ask_impl(&self.state, params.0).await
    }

    /// Report query cache statistics.
    #[tool(description = "Report the number of cached query results, their TTL, and whether the cache is shared.")]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.state.cache).await
    }

    /// Drop every cached query result.
    #[tool(description = "Clear all cached query results and coalescing locks.")]
    async fn cache_clear(&self) -> Result<CallToolResult, McpError> {
        clear_impl(&self.state.cache).await
    }
}

impl ServerHandler for SomoTutorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "somo-tutor".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
