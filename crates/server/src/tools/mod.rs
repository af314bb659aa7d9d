//! MCP tool implementations.
//!
//! This module contains all tools exposed by the linkpeek server.

pub mod cache;
pub mod web_scrape;

#[cfg(test)]
pub(crate) mod test_support;
