//! Cache key derivation for scraped pages.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Namespace prepended to every page key.
pub const KEY_NAMESPACE: &str = "scrape:";

/// Number of URL characters kept by [`KeyStrategy::Prefix`].
pub const KEY_URL_CHARS: usize = 200;

/// How a URL is turned into a store key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// `scrape:` + the first 200 characters of the URL. Distinct URLs that
    /// share those 200 characters map to the same entry.
    #[default]
    Prefix,

    /// `scrape:sha256:` + hex SHA-256 of the full URL. Collision-free for
    /// practical purposes, but not readable by consumers of the prefix form.
    Hashed,
}

/// Derive the store key for a URL.
pub fn compute_cache_key(url: &str, strategy: KeyStrategy) -> String {
    match strategy {
        KeyStrategy::Prefix => {
            let truncated: String = url.chars().take(KEY_URL_CHARS).collect();
            format!("{KEY_NAMESPACE}{truncated}")
        }
        KeyStrategy::Hashed => {
            let mut hasher = Sha256::new();
            hasher.update(url.as_bytes());
            format!("{KEY_NAMESPACE}sha256:{}", hex::encode(hasher.finalize()))
        }
    }
}
