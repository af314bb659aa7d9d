//! SQLite-backed cache for scraped pages.
//!
//! This module provides a persistent, TTL-bounded key-value cache using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - URL-derived keys (`scrape:` namespace, prefix or hashed form)
//! - Per-entry expiry with lazy filtering and explicit purge
//! - Versioned schema setup on open
//! - WAL mode for concurrent access
//! - Shape validation and a size ceiling on every write

pub mod connection;
pub mod key;
pub mod page;
pub mod store;

pub use crate::Error;

pub use connection::{CacheDb, SCHEMA_VERSION};
pub use key::{KeyStrategy, compute_cache_key};
pub use page::{CachePolicy, DEFAULT_MAX_ENTRY_BYTES, DEFAULT_TTL_SECS, PageCache, SkipReason, WriteOutcome};
pub use store::{KvStore, StoredValue};
