//! Key-value storage with native expiry.
//!
//! `KvStore` is the seam between the page cache and whatever holds the
//! bytes. Stores may hand values back either as raw strings or as already
//! structured JSON, so reads return a [`StoredValue`] and the caller decides
//! how to decode it.

use async_trait::async_trait;
use serde_json::Value;
use tokio_rusqlite::{params, rusqlite};

use super::connection::CacheDb;
use crate::Error;

/// A value as it comes back from a store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Opaque string, typically JSON text.
    Text(String),
    /// Structured value the store decoded itself.
    Json(Value),
}

impl StoredValue {
    fn kind(&self) -> &'static str {
        match self {
            StoredValue::Text(_) => "text",
            StoredValue::Json(_) => "json",
        }
    }

    fn into_column(self) -> String {
        match self {
            StoredValue::Text(s) => s,
            StoredValue::Json(v) => v.to_string(),
        }
    }

    fn from_column(kind: &str, raw: String) -> Self {
        if kind == "json"
            && let Ok(value) = serde_json::from_str(&raw)
        {
            return StoredValue::Json(value);
        }
        StoredValue::Text(raw)
    }
}

/// Single-key storage operations with per-entry expiry.
///
/// Implementations must treat each call as atomic for its key; no
/// cross-key coordination is required.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a live entry. Expired entries are reported as absent.
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, Error>;

    /// Write an entry that expires `ttl_secs` seconds from now, replacing
    /// any previous value for the key.
    async fn set_ex(&self, key: &str, value: StoredValue, ttl_secs: u64) -> Result<(), Error>;

    /// Remove an entry. Returns whether anything was deleted.
    async fn del(&self, key: &str) -> Result<bool, Error>;

    /// Drop every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, Error>;
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
impl KvStore for CacheDb {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, Error> {
        let key = key.to_string();
        let now = now_ms();
        self.conn
            .call(move |conn| -> Result<Option<StoredValue>, Error> {
                let result = conn.query_row(
                    "SELECT value_kind, value FROM kv_entries
                     WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                    params![key, now],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                );

                match result {
                    Ok((kind, raw)) => Ok(Some(StoredValue::from_column(&kind, raw))),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn set_ex(&self, key: &str, value: StoredValue, ttl_secs: u64) -> Result<(), Error> {
        let key = key.to_string();
        let kind = value.kind();
        let raw = value.into_column();
        let now = now_ms();
        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_ms);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO kv_entries (key, value, value_kind, created_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        value_kind = excluded.value_kind,
                        created_at = excluded.created_at,
                        expires_at = excluded.expires_at",
                    params![key, raw, kind, now, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn del(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let now = now_ms();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                    params![now],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
