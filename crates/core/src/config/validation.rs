//! Configuration validation rules.
//!
//! This module provides validation logic for `CacheConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::CacheConfig;
use thiserror::Error;

const MAX_MEMORY_BUDGET_BYTES: usize = 256 * 1024 * 1024;
const MIN_TTL_MS: u64 = 1_000;
const MAX_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl CacheConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `memory_budget_bytes` is 0 or exceeds 256MB
    /// - `ttl_ms` is less than 1s or exceeds 7 days
    /// - `db_path` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_budget_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "memory_budget_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.memory_budget_bytes > MAX_MEMORY_BUDGET_BYTES {
            return Err(ConfigError::Invalid {
                field: "memory_budget_bytes".into(),
                reason: "must not exceed 256MB".into(),
            });
        }

        if self.ttl_ms < MIN_TTL_MS {
            return Err(ConfigError::Invalid { field: "ttl_ms".into(), reason: "must be at least 1000ms".into() });
        }
        if self.ttl_ms > MAX_TTL_MS {
            return Err(ConfigError::Invalid { field: "ttl_ms".into(), reason: "must not exceed 7 days".into() });
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "db_path".into(), reason: "must not be empty".into() });
        }

        if self.memory_budget_bytes < 4096 {
            tracing::warn!(
                memory_budget_bytes = self.memory_budget_bytes,
                "memory budget is smaller than a typical search page; most results will bypass the memory tier"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_budget_zero() {
        let config = CacheConfig { memory_budget_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "memory_budget_bytes"));
    }

    #[test]
    fn test_validate_budget_exceeds_limit() {
        let config = CacheConfig { memory_budget_bytes: 257 * 1024 * 1024, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "memory_budget_bytes"));
    }

    #[test]
    fn test_validate_ttl_too_small() {
        let config = CacheConfig { ttl_ms: 999, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ttl_ms"));
    }

    #[test]
    fn test_validate_ttl_exceeds_limit() {
        let config = CacheConfig { ttl_ms: MAX_TTL_MS + 1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ttl_ms"));
    }

    #[test]
    fn test_validate_empty_db_path() {
        let config = CacheConfig { db_path: PathBuf::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "db_path"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = CacheConfig { memory_budget_bytes: 1, ttl_ms: MIN_TTL_MS, ..Default::default() };
        assert!(config.validate().is_ok());

        let config =
            CacheConfig { memory_budget_bytes: MAX_MEMORY_BUDGET_BYTES, ttl_ms: MAX_TTL_MS, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
