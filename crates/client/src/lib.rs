//! Client code for linkpeek.
//!
//! This crate provides URL detection, the HTTP fetch pipeline, content
//! extraction and the cache-aside scrape orchestrator used by the server.

pub mod detect;
pub mod extract;
pub mod fetch;
pub mod scrape;

pub use detect::{DetectedUrl, detect_url, split_query};
pub use extract::{Extractor, SelectorExtractor, extract_page, normalize_whitespace, truncate_chars};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, PageFetcher, UrlError, canonicalize};
pub use scrape::Scraper;
