//! Cache-aside scrape orchestration.
//!
//! ### Flow
//! - Cache lookup by URL; a hit is returned as stored.
//! - Miss: fetch, then extract. Any failure becomes the generic failed
//!   record; the cause only reaches the logs.
//! - Success: the cache write runs as a detached task and the fresh record
//!   is returned without waiting for it.
//!
//! Failed scrapes are never cached, and nothing is retried.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use linkpeek_core::{AppConfig, CacheDb, Error, PageCache, ScrapedContent};

use crate::extract::{Extractor, SelectorExtractor};
use crate::fetch::{FetchClient, FetchConfig, PageFetcher};

/// Fetches, extracts and caches pages by URL.
pub struct Scraper {
    cache: PageCache,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn Extractor>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Scraper {
    pub fn new(cache: PageCache, fetcher: Arc<dyn PageFetcher>, extractor: Arc<dyn Extractor>) -> Self {
        Self { cache, fetcher, extractor, pending: Mutex::new(Vec::new()) }
    }

    /// Wire the SQLite cache, HTTP client and selector extractor from configuration.
    ///
    /// A cache file that can't be opened falls back to an in-memory store,
    /// so scraping keeps working without persistence.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let db = match CacheDb::open(&config.db_path).await {
            Ok(db) => {
                tracing::info!(db_path = %config.db_path.display(), "cache database opened");
                db
            }
            Err(e) => {
                tracing::error!(
                    db_path = %config.db_path.display(),
                    error = %e,
                    "cannot open cache database, using in-memory cache"
                );
                CacheDb::open_in_memory().await?
            }
        };
        let cache = PageCache::new(Arc::new(db), config.cache_policy());
        let fetcher = FetchClient::new(FetchConfig::from(config))?;

        Ok(Self::new(cache, Arc::new(fetcher), Arc::new(SelectorExtractor::new())))
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// Scrape `url`, serving from cache when possible.
    ///
    /// Never fails: fetch and extraction errors come back as a record whose
    /// `error` is set and whose text fields are empty.
    pub async fn scrape(&self, url: &str) -> ScrapedContent {
        if let Some(cached) = self.cache.get(url).await {
            return cached;
        }

        let record = match self.fetch_and_extract(url).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(%url, error = %e, "scrape failed");
                return ScrapedContent::failed(url);
            }
        };

        self.spawn_write(url, &record).await;
        record
    }

    /// Wait for every cache write issued so far.
    pub async fn flush(&self) {
        let handles = std::mem::take(&mut *self.pending.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "cache write task panicked");
            }
        }
    }

    async fn fetch_and_extract(&self, url: &str) -> Result<ScrapedContent, Error> {
        let response = self.fetcher.fetch(url).await?;
        self.extractor.extract(&response.html(), url)
    }

    async fn spawn_write(&self, url: &str, record: &ScrapedContent) {
        let cache = self.cache.clone();
        let url = url.to_string();
        let record = record.clone();

        let handle = tokio::spawn(async move {
            cache.set(&url, &record).await;
        });

        let mut pending = self.pending.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}
