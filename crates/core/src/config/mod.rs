//! Cache configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (ITBOOK_CACHE_*)
//! 2. TOML config file (if ITBOOK_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Search result cache configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (ITBOOK_CACHE_*)
/// 2. TOML config file (if ITBOOK_CACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Path to the SQLite database backing the durable tier.
    ///
    /// Set via ITBOOK_CACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Total payload bytes the memory tier may hold.
    ///
    /// Set via ITBOOK_CACHE_MEMORY_BUDGET_BYTES environment variable.
    #[serde(default = "default_memory_budget_bytes")]
    pub memory_budget_bytes: usize,

    /// Age in milliseconds after which a cached result is stale.
    ///
    /// Set via ITBOOK_CACHE_TTL_MS environment variable.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./itbook-search-cache.sqlite")
}

fn default_memory_budget_bytes() -> usize {
    1024 * 1024 // 1MB
}

fn default_ttl_ms() -> u64 {
    15 * 60 * 1000 // 15 min
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            memory_budget_bytes: default_memory_budget_bytes(),
            ttl_ms: default_ttl_ms(),
        }
    }
}

impl CacheConfig {
    /// Staleness TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `ITBOOK_CACHE_`
    /// 2. TOML file from `ITBOOK_CACHE_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("ITBOOK_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ITBOOK_CACHE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
