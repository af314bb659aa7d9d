//! linkpeek-mcp server entry point.
//!
//! Boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use linkpeek_client::Scraper;
use linkpeek_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let scraper = Arc::new(Scraper::from_config(&config).await?);

    tracing::info!("Starting linkpeek-mcp server on stdio transport");

    let handler = handler::LinkpeekServer::new(scraper.clone());
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    scraper.flush().await;
    tracing::info!("linkpeek-mcp stopped");

    Ok(())
}
