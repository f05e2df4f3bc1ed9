//! Cache-aside manager for paged search results.
//!
//! Reads check the memory tier, then the durable store, warming memory on a
//! store hit. Writes go to memory first and then to the store. Two policies
//! act on the same entries without knowing about each other:
//!
//! - Memory pressure: [`MemoryCache`] silently drops least-recently-used
//!   entries once the byte budget is exceeded. The store is never touched.
//! - Staleness: [`SearchResultManager::lookup_fresh`] compares an entry's age
//!   against a TTL at read time and, when it is too old, invalidates every
//!   page of that query in both tiers.
//!
//! # Consistency
//!
//! The memory lock is never held across a store call, so the two tiers are
//! not updated atomically. A `lookup` racing an `invalidate` of the same
//! query can return the last memory copy of an entry that was just deleted,
//! or warm memory from a store read that completed before the delete. The
//! next TTL-gated read restores correctness.
//!
//! A store read never replaces a memory entry that is at least as new, so a
//! `lookup` that overlaps a `populate` of the same page can't leave memory
//! older than the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::connection::CacheDb;
use super::key::CacheKey;
use super::memory::{CacheStats, MemoryCache};
use super::search::SearchResult;
use super::store::SearchStore;
use crate::Error;
use crate::config::CacheConfig;

/// Two-tier search result cache.
///
/// Cloning is cheap and every clone shares both tiers, so one instance
/// built at startup can be handed to each caller.
#[derive(Clone)]
pub struct SearchResultManager {
    memory: Arc<Mutex<MemoryCache>>,
    store: Arc<dyn SearchStore>,
    ttl: Duration,
}

impl SearchResultManager {
    /// Create a manager over an existing store.
    pub fn new(store: Arc<dyn SearchStore>, memory_budget_bytes: usize, ttl: Duration) -> Self {
        Self { memory: Arc::new(Mutex::new(MemoryCache::new(memory_budget_bytes))), store, ttl }
    }

    /// Create a manager over an existing store using the configured budget and TTL.
    pub fn with_config(store: Arc<dyn SearchStore>, config: &CacheConfig) -> Self {
        Self::new(store, config.memory_budget_bytes, config.ttl())
    }

    /// Open the SQLite store at `config.db_path` and build a manager over it.
    pub async fn open(config: &CacheConfig) -> Result<Self, Error> {
        let db = CacheDb::open(&config.db_path).await?;
        Ok(Self::with_config(Arc::new(db), config))
    }

    /// Default staleness TTL for [`Self::lookup_fresh`] callers.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Find a page in memory, falling back to the durable store.
    ///
    /// A store hit is copied into memory before it is returned, unless a
    /// concurrent write already left a newer entry there, in which case that
    /// entry is returned.
    pub async fn lookup(&self, query: &str, page: u32) -> Result<Option<SearchResult>, Error> {
        let key = CacheKey::new(query, page);
        {
            let mut memory = self.memory.lock().await;
            if let Some(hit) = memory.get(&key) {
                tracing::debug!(query, page, "search cache memory hit");
                return Ok(Some(hit));
            }
        }

        match self.store.get(query, page).await? {
            Some(result) => {
                tracing::debug!(query, page, "search cache store hit, warming memory");
                Ok(Some(self.memory.lock().await.warm(key, result)))
            }
            None => {
                tracing::debug!(query, page, "search cache miss");
                Ok(None)
            }
        }
    }

    /// Staleness-aware read that decodes the payload as JSON.
    ///
    /// Returns `Ok(None)` on a miss, on a stale entry (after invalidating the
    /// whole query) and on a payload that fails to decode. Only store
    /// failures are errors.
    pub async fn lookup_fresh<T: DeserializeOwned>(
        &self, query: &str, page: u32, ttl: Duration,
    ) -> Result<Option<T>, Error> {
        self.lookup_fresh_with(query, page, ttl, |payload| serde_json::from_str::<T>(payload))
            .await
    }

    /// Staleness-aware read with a caller-supplied decoder.
    pub async fn lookup_fresh_with<T, E, F>(
        &self, query: &str, page: u32, ttl: Duration, decode: F,
    ) -> Result<Option<T>, Error>
    where
        E: std::fmt::Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        let Some(result) = self.lookup(query, page).await? else {
            return Ok(None);
        };

        let now = Utc::now().timestamp_millis();
        if result.is_stale_at(ttl, now) {
            tracing::warn!(
                query,
                page,
                created_at = result.created_at,
                age_ms = result.age_at(now).as_millis() as u64,
                ttl_ms = ttl.as_millis() as u64,
                "search result is stale, invalidating query"
            );
            self.invalidate(query).await?;
            return Ok(None);
        }

        match decode(&result.payload) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                tracing::warn!(query, page, "failed to decode cached search result: {}", e);
                Ok(None)
            }
        }
    }

    /// Cache a freshly fetched page in both tiers.
    pub async fn populate(&self, query: &str, page: u32, payload: impl Into<String>) -> Result<SearchResult, Error> {
        let result = SearchResult::new(query, page, payload);
        self.put(result.clone()).await?;
        Ok(result)
    }

    /// Store a prepared entry in memory and then in the durable store.
    ///
    /// If the store rejects the write the memory slot is dropped again and
    /// the store error is returned.
    pub async fn put(&self, result: SearchResult) -> Result<(), Error> {
        let key = result.key();
        tracing::debug!(query = %result.query, page = result.page, size = result.size(), "caching search result");

        self.memory.lock().await.insert(key.clone(), result.clone());

        if let Err(e) = self.store.insert(&result).await {
            self.memory.lock().await.remove(&key);
            return Err(e);
        }

        let stats = self.stats().await;
        tracing::debug!(
            puts = stats.puts,
            evictions = stats.evictions,
            hits = stats.hits,
            misses = stats.misses,
            size_bytes = stats.size_bytes,
            "search cache memory stats"
        );
        Ok(())
    }

    /// Remove every page of `query` from both tiers.
    ///
    /// Returns the number of pages deleted from the durable store.
    pub async fn invalidate(&self, query: &str) -> Result<u64, Error> {
        let targets = self.store.get_all_by_query(query).await?;

        {
            let mut memory = self.memory.lock().await;
            for target in &targets {
                memory.remove(&target.key());
            }
            let stray = memory.remove_query(query);
            if stray > 0 {
                tracing::debug!(query, stray, "removed memory-only pages during invalidation");
            }
        }

        let deleted = self.store.delete_by_query(query).await?;
        tracing::debug!(query, pages = targets.len(), deleted, "invalidated search query");
        Ok(deleted)
    }

    /// Drop everything from the memory tier. The durable store is untouched.
    pub async fn clear(&self) {
        self.memory.lock().await.clear();
        tracing::debug!("cleared search cache memory tier");
    }

    pub async fn stats(&self) -> CacheStats {
        self.memory.lock().await.stats()
    }
}
