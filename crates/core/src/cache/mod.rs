//! Two-tier cache for paged search results.
//!
//! Results are keyed by `(query, page)` and live in two places:
//!
//! - A byte-budgeted LRU memory tier for hot pages
//! - A SQLite table that survives restarts
//!
//! [`SearchResultManager`] ties the tiers together with a cache-aside read
//! path, dual writes, query-wide invalidation and a lazy TTL check.

pub mod connection;
pub mod key;
pub mod manager;
pub mod memory;
pub mod migrations;
pub mod search;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use key::CacheKey;
pub use manager::SearchResultManager;
pub use memory::{CacheStats, MemoryCache};
pub use search::SearchResult;
pub use store::SearchStore;
