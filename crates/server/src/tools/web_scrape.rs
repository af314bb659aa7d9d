//! web_scrape tool implementation.
//!
//! Finds the first URL in a chat message, scrapes it through the cache and
//! hands back the page text together with the rest of the message.

use linkpeek_client::{Scraper, split_query};
use linkpeek_core::{Error, ScrapedContent};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for web_scrape tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebScrapeParams {
    /// Free-form message that may contain a URL.
    pub text: String,
}

/// Output structure for web_scrape tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebScrapeOutput {
    /// First URL found in the message, as written.
    pub url: Option<String>,
    /// The message with that URL removed, trimmed.
    pub query: String,
    /// Scraped page, or null when the message has no URL.
    pub record: Option<ScrapedContent>,
}

/// Implementation of the web_scrape tool.
///
/// Scrape failures are reported inside `record.error`, not as tool errors.
pub async fn scrape_impl(scraper: &Scraper, params: WebScrapeParams) -> Result<CallToolResult, McpError> {
    if params.text.trim().is_empty() {
        return Err(Error::InvalidInput("text cannot be empty".into()).into());
    }

    let output = match split_query(&params.text) {
        Some(detected) => {
            let record = scraper.scrape(detected.url).await;
            WebScrapeOutput { url: Some(detected.url.to_string()), query: detected.query, record: Some(record) }
        }
        None => {
            tracing::debug!("no URL in message");
            WebScrapeOutput { url: None, query: params.text.trim().to_string(), record: None }
        }
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
