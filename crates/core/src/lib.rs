//! Core types and shared functionality for linkpeek.
//!
//! This crate provides:
//! - The `ScrapedContent` record and its shape validation
//! - Page cache with a SQLite key-value backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod record;

pub use cache::{CacheDb, CachePolicy, KeyStrategy, KvStore, PageCache, StoredValue};
pub use config::AppConfig;
pub use error::Error;
pub use record::{Headings, MAX_CONTENT_CHARS, SCRAPE_FAILED_MESSAGE, ScrapedContent};
