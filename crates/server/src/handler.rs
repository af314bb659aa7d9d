//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CachePurgeParams, purge_impl};
use crate::tools::web_scrape::{WebScrapeParams, scrape_impl};

use linkpeek_client::Scraper;
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

/// The main MCP server handler for linkpeek.
#[derive(Clone)]
pub struct LinkpeekServer {
    scraper: Arc<Scraper>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl LinkpeekServer {
    /// Create a new server handler around a shared scraper.
    pub fn new(scraper: Arc<Scraper>) -> Self {
        Self { scraper, tool_router: Self::tool_router() }
    }

    /// Detect the first URL in a message and scrape it.
    #[tool(
        description = "Find the first URL in a message, scrape it (cached for 7 days) and return the page text with the remaining question."
    )]
    async fn web_scrape(&self, params: Parameters<WebScrapeParams>) -> Result<CallToolResult, McpError> {
        scrape_impl(&self.scraper, params.0).await
    }

    /// Drop expired cache entries.
    #[tool(description = "Delete expired entries from the scrape cache. Returns the number removed.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(self.scraper.cache(), params.0).await
    }
}

impl ServerHandler for LinkpeekServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "linkpeek".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_scraper;

    #[tokio::test]
    async fn test_registers_both_tools() {
        let server = LinkpeekServer::new(Arc::new(offline_scraper().await));
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["cache_purge", "web_scrape"]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let server = LinkpeekServer::new(Arc::new(offline_scraper().await));
        let info = server.get_info();
        assert_eq!(info.server_info.name, "linkpeek");
        assert!(info.capabilities.tools.is_some());
    }
}
