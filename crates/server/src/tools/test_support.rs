//! Offline scrapers for tool tests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use linkpeek_client::{FetchResponse, PageFetcher, Scraper, SelectorExtractor};
use linkpeek_core::{CacheDb, CachePolicy, Error, PageCache};
use reqwest::{StatusCode, Url};
use rmcp::model::CallToolResult;

/// Always serves the same HTML body.
pub struct CannedFetcher(pub &'static str);

#[async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchResponse, Error> {
        let url = Url::parse("https://canned.test/").unwrap();
        Ok(FetchResponse {
            url: url.clone(),
            final_url: url,
            status: StatusCode::OK,
            content_type: Some("text/html".into()),
            bytes: Bytes::from_static(self.0.as_bytes()),
            fetch_ms: 0,
        })
    }
}

/// Fails every request like an unreachable host.
pub struct UnreachableFetcher;

#[async_trait]
impl PageFetcher for UnreachableFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchResponse, Error> {
        Err(Error::FetchFailed("network error: connection refused".into()))
    }
}

pub async fn scraper_with(fetcher: Arc<dyn PageFetcher>) -> (Scraper, Arc<CacheDb>) {
    let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let cache = PageCache::new(db.clone(), CachePolicy::default());
    (Scraper::new(cache, fetcher, Arc::new(SelectorExtractor::new())), db)
}

pub async fn offline_scraper() -> Scraper {
    scraper_with(Arc::new(UnreachableFetcher)).await.0
}

/// Text payload of the first content block.
pub fn result_text(result: &CallToolResult) -> String {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content")
        .to_string()
}
