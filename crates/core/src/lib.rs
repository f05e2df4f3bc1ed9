//! Two-tier search result cache for itbook.
//!
//! This crate provides:
//! - A byte-budgeted in-memory LRU tier
//! - A durable SQLite tier that outlives the process
//! - A cache-aside manager with lazy TTL staleness checks
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheKey, CacheStats, MemoryCache, SearchResult, SearchResultManager, SearchStore};
pub use config::{CacheConfig, ConfigError};
pub use error::Error;
