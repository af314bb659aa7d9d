//! Fail-soft page cache over a [`KvStore`].
//!
//! Every operation here swallows store errors: a broken or unreachable
//! store degrades to "miss" on read and "skip" on write, and is only logged.

use std::sync::Arc;

use serde_json::Value;

use super::key::{KeyStrategy, compute_cache_key};
use super::store::{KvStore, StoredValue};
use crate::Error;
use crate::record::{ScrapedContent, validate_shape};

/// Seven days, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Largest serialized record written to the store, in bytes.
pub const DEFAULT_MAX_ENTRY_BYTES: usize = 1_024_000;

/// Limits applied to cache writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl_secs: u64,
    pub max_entry_bytes: usize,
    pub key_strategy: KeyStrategy,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { ttl_secs: DEFAULT_TTL_SECS, max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES, key_strategy: KeyStrategy::Prefix }
    }
}

/// Why a record was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidShape(String),
    TooLarge { bytes: usize, limit: usize },
}

/// Outcome of [`PageCache::set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored { bytes: usize },
    Skipped(SkipReason),
    StoreFailed,
}

/// URL-keyed cache of [`ScrapedContent`] records.
#[derive(Clone)]
pub struct PageCache {
    store: Arc<dyn KvStore>,
    policy: CachePolicy,
}

impl PageCache {
    pub fn new(store: Arc<dyn KvStore>, policy: CachePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn key_for(&self, url: &str) -> String {
        compute_cache_key(url, self.policy.key_strategy)
    }

    /// Look up a cached record.
    ///
    /// Undecodable or malformed entries are deleted and reported as a miss.
    pub async fn get(&self, url: &str) -> Option<ScrapedContent> {
        let key = self.key_for(url);

        let stored = match self.store.get(&key).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::debug!(%key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::error!(%key, error = %e, "cache read failed");
                return None;
            }
        };

        match decode(stored) {
            Ok(record) => {
                if let Some(cached_at) = record.cached_at {
                    let age_minutes = (chrono::Utc::now().timestamp_millis() - cached_at) / 60_000;
                    tracing::debug!(%key, age_minutes, "cache hit");
                } else {
                    tracing::debug!(%key, "cache hit");
                }
                Some(record)
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "discarding invalid cache entry");
                self.delete_key(&key).await;
                None
            }
        }
    }

    /// Store a record, stamping `cached_at` with the current time.
    ///
    /// Records that fail shape validation or exceed the size ceiling are not
    /// written. The caller's record is left untouched either way.
    pub async fn set(&self, url: &str, content: &ScrapedContent) -> WriteOutcome {
        let key = self.key_for(url);

        let mut stamped = content.clone();
        stamped.cached_at = Some(chrono::Utc::now().timestamp_millis());

        let value = match serde_json::to_value(&stamped) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(%key, error = %e, "failed to encode record for cache");
                return WriteOutcome::Skipped(SkipReason::InvalidShape(e.to_string()));
            }
        };

        if let Err(e) = validate_shape(&value) {
            tracing::error!(%key, error = %e, "refusing to cache record with invalid shape");
            return WriteOutcome::Skipped(SkipReason::InvalidShape(e.to_string()));
        }

        let serialized = value.to_string();
        let bytes = serialized.len();
        if bytes > self.policy.max_entry_bytes {
            tracing::warn!(%key, bytes, limit = self.policy.max_entry_bytes, "record too large to cache");
            return WriteOutcome::Skipped(SkipReason::TooLarge { bytes, limit: self.policy.max_entry_bytes });
        }

        match self
            .store
            .set_ex(&key, StoredValue::Text(serialized), self.policy.ttl_secs)
            .await
        {
            Ok(()) => {
                tracing::info!(%key, bytes, ttl_secs = self.policy.ttl_secs, "cached record");
                WriteOutcome::Stored { bytes }
            }
            Err(e) => {
                tracing::error!(%key, error = %e, "cache write failed");
                WriteOutcome::StoreFailed
            }
        }
    }

    /// Remove the entry for a URL, if any.
    pub async fn delete(&self, url: &str) {
        let key = self.key_for(url);
        self.delete_key(&key).await;
    }

    /// Drop expired entries from the underlying store.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        self.store.purge_expired().await
    }

    async fn delete_key(&self, key: &str) {
        if let Err(e) = self.store.del(key).await {
            tracing::error!(%key, error = %e, "cache delete failed");
        }
    }
}

/// Normalize either stored representation into a validated record.
fn decode(stored: StoredValue) -> Result<ScrapedContent, Error> {
    let value: Value = match stored {
        StoredValue::Text(raw) => {
            serde_json::from_str(&raw).map_err(|e| Error::CacheCorrupt(format!("unparseable entry: {e}")))?
        }
        StoredValue::Json(value) => value,
    };

    validate_shape(&value).map_err(|e| Error::CacheCorrupt(e.to_string()))?;

    serde_json::from_value(value).map_err(|e| Error::CacheCorrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheDb;
    use crate::record::{Headings, MAX_CONTENT_CHARS};
    use async_trait::async_trait;
    use serde_json::json;

    fn sample(url: &str) -> ScrapedContent {
        ScrapedContent {
            url: url.to_string(),
            title: "T".into(),
            headings: Headings { h1: "Hi".into(), h2: String::new() },
            meta_description: String::new(),
            content: "T Hi World".into(),
            error: None,
            cached_at: None,
        }
    }

    async fn cache_with_db() -> (PageCache, CacheDb) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = PageCache::new(Arc::new(db.clone()), CachePolicy::default());
        (cache, db)
    }

    /// Store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KvStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<StoredValue>, Error> {
            Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        }

        async fn set_ex(&self, _key: &str, _value: StoredValue, _ttl_secs: u64) -> Result<(), Error> {
            Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        }

        async fn del(&self, _key: &str) -> Result<bool, Error> {
            Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        }

        async fn purge_expired(&self) -> Result<u64, Error> {
            Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        }
    }

    #[tokio::test]
    async fn test_set_then_get_stamps_cached_at() {
        let (cache, _db) = cache_with_db().await;
        let record = sample("https://example.com");

        let before = chrono::Utc::now().timestamp_millis();
        let outcome = cache.set("https://example.com", &record).await;
        assert!(matches!(outcome, WriteOutcome::Stored { .. }));
        assert!(record.cached_at.is_none());

        let cached = cache.get("https://example.com").await.unwrap();
        assert!(cached.cached_at.unwrap() >= before);
        assert_eq!(cached.content, record.content);
        assert_eq!(cached.headings, record.headings);
    }

    #[tokio::test]
    async fn test_entry_written_as_json_text_under_prefix_key() {
        let (cache, db) = cache_with_db().await;
        cache.set("https://example.com/page", &sample("https://example.com/page")).await;

        let stored = db.get("scrape:https://example.com/page").await.unwrap();
        let Some(StoredValue::Text(raw)) = stored else {
            panic!("expected a text entry");
        };
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["url"], "https://example.com/page");
        assert!(value["cachedAt"].is_i64());
    }

    #[tokio::test]
    async fn test_get_accepts_structured_value() {
        let (cache, db) = cache_with_db().await;
        let value = serde_json::to_value(sample("https://example.com")).unwrap();
        db.set_ex("scrape:https://example.com", StoredValue::Json(value), 60)
            .await
            .unwrap();

        let cached = cache.get("https://example.com").await.unwrap();
        assert_eq!(cached.title, "T");
    }

    #[tokio::test]
    async fn test_unparseable_entry_is_deleted() {
        let (cache, db) = cache_with_db().await;
        db.set_ex("scrape:https://example.com", StoredValue::Text("{oops".into()), 60)
            .await
            .unwrap();

        assert!(cache.get("https://example.com").await.is_none());
        assert!(db.get("scrape:https://example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_entry_is_deleted() {
        let (cache, db) = cache_with_db().await;
        let bad = json!({
            "url": "https://example.com",
            "title": "T",
            "headings": { "h2": "" },
            "metaDescription": "",
            "content": "x",
            "error": null
        });
        db.set_ex("scrape:https://example.com", StoredValue::Text(bad.to_string()), 60)
            .await
            .unwrap();

        assert!(cache.get("https://example.com").await.is_none());
        assert!(db.get("scrape:https://example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_record_is_not_written() {
        let (cache, db) = cache_with_db().await;
        let mut record = sample("https://example.com");
        record.content = "a".repeat(MAX_CONTENT_CHARS + 1);

        let outcome = cache.set("https://example.com", &record).await;
        assert!(matches!(outcome, WriteOutcome::Skipped(SkipReason::InvalidShape(_))));
        assert!(db.get("scrape:https://example.com").await.unwrap().is_none());
        assert!(cache.get("https://example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_oversized_record_is_not_written() {
        let (cache, db) = cache_with_db().await;
        let mut record = sample("https://example.com");
        record.headings.h2 = "h".repeat(1_100_000);

        let outcome = cache.set("https://example.com", &record).await;
        match outcome {
            WriteOutcome::Skipped(SkipReason::TooLarge { bytes, limit }) => {
                assert!(bytes > 1_100_000);
                assert_eq!(limit, DEFAULT_MAX_ENTRY_BYTES);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(db.get("scrape:https://example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (cache, _db) = cache_with_db().await;
        cache.set("https://example.com", &sample("https://example.com")).await;
        cache.delete("https://example.com").await;
        assert!(cache.get("https://example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_hashed_strategy_round_trip() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let policy = CachePolicy { key_strategy: KeyStrategy::Hashed, ..Default::default() };
        let cache = PageCache::new(Arc::new(db.clone()), policy);

        cache.set("https://example.com", &sample("https://example.com")).await;
        assert!(cache.get("https://example.com").await.is_some());
        assert!(db.get("scrape:https://example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_broken_store_is_fail_soft() {
        let cache = PageCache::new(Arc::new(BrokenStore), CachePolicy::default());

        assert!(cache.get("https://example.com").await.is_none());
        assert_eq!(cache.set("https://example.com", &sample("https://example.com")).await, WriteOutcome::StoreFailed);
        cache.delete("https://example.com").await;
        assert!(cache.purge_expired().await.is_err());
    }
}
