//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LINKPEEK_*)
//! 2. TOML config file (if LINKPEEK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{CachePolicy, KeyStrategy};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LINKPEEK_*)
/// 2. TOML config file (if LINKPEEK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via LINKPEEK_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via LINKPEEK_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum response body bytes to accept per fetch.
    ///
    /// Set via LINKPEEK_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via LINKPEEK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum redirects followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Lifetime of a cached page in seconds (default: 7 days).
    ///
    /// Set via LINKPEEK_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Largest serialized record the cache will store.
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: usize,

    /// How cache keys are derived from URLs: "prefix" or "hashed".
    #[serde(default)]
    pub key_strategy: KeyStrategy,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./linkpeek-cache.sqlite")
}

fn default_user_agent() -> String {
    "linkpeek/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_cache_ttl_secs() -> u64 {
    crate::cache::DEFAULT_TTL_SECS
}

fn default_max_entry_bytes() -> usize {
    crate::cache::DEFAULT_MAX_ENTRY_BYTES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_entry_bytes: default_max_entry_bytes(),
            key_strategy: KeyStrategy::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache limits derived from this configuration.
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            ttl_secs: self.cache_ttl_secs,
            max_entry_bytes: self.max_entry_bytes,
            key_strategy: self.key_strategy,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LINKPEEK_`
    /// 2. TOML file from `LINKPEEK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LINKPEEK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LINKPEEK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./linkpeek-cache.sqlite"));
        assert_eq!(config.user_agent, "linkpeek/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.cache_ttl_secs, 604_800);
        assert_eq!(config.max_entry_bytes, 1_024_000);
        assert_eq!(config.key_strategy, KeyStrategy::Prefix);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_cache_policy_from_config() {
        let config = AppConfig { cache_ttl_secs: 60, key_strategy: KeyStrategy::Hashed, ..Default::default() };
        let policy = config.cache_policy();
        assert_eq!(policy.ttl_secs, 60);
        assert_eq!(policy.max_entry_bytes, 1_024_000);
        assert_eq!(policy.key_strategy, KeyStrategy::Hashed);
    }

    #[test]
    fn test_key_strategy_from_toml() {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("key_strategy = \"hashed\"\ncache_ttl_secs = 3600"))
            .extract()
            .unwrap();
        assert_eq!(config.key_strategy, KeyStrategy::Hashed);
        assert_eq!(config.cache_ttl_secs, 3600);
    }
}
