//! Byte-budgeted LRU memory tier.
//!
//! Capacity is the sum of payload lengths, not the entry count. The `lru`
//! crate only tracks recency here; it is created unbounded and the byte
//! budget is enforced by popping least-recently-used entries on insert.

use lru::LruCache;

use super::key::CacheKey;
use super::search::SearchResult;

/// Point-in-time counters for the memory tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub evictions: u64,
    pub entries: usize,
    pub size_bytes: usize,
    pub budget_bytes: usize,
}

/// In-memory tier of the search cache.
///
/// Not synchronized on its own; the manager wraps it in a mutex.
pub struct MemoryCache {
    entries: LruCache<CacheKey, SearchResult>,
    size_bytes: usize,
    budget_bytes: usize,
    hits: u64,
    misses: u64,
    puts: u64,
    evictions: u64,
}

impl MemoryCache {
    /// Create an empty tier that holds at most `budget_bytes` of payload.
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            size_bytes: 0,
            budget_bytes,
            hits: 0,
            misses: 0,
            puts: 0,
            evictions: 0,
        }
    }

    /// Look up an entry and mark it most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<SearchResult> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits += 1;
                Some(entry.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check residency without touching recency or counters.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains(key)
    }

    /// Insert or replace an entry, evicting least-recently-used entries until it fits.
    ///
    /// An entry larger than the whole budget is not kept, and any previous
    /// value under its key is dropped. Returns whether the entry is resident.
    pub fn insert(&mut self, key: CacheKey, entry: SearchResult) -> bool {
        let size = entry.size();
        if let Some(old) = self.entries.pop(&key) {
            self.size_bytes -= old.size();
        }

        if size > self.budget_bytes {
            tracing::debug!(
                key = %key,
                size,
                budget = self.budget_bytes,
                "search result larger than memory budget, not cached in memory"
            );
            return false;
        }

        while self.size_bytes + size > self.budget_bytes {
            let Some((evicted_key, evicted)) = self.entries.pop_lru() else {
                break;
            };
            self.size_bytes -= evicted.size();
            self.evictions += 1;
            tracing::debug!(key = %evicted_key, query = %evicted.query, page = evicted.page, "evicted search result");
        }

        self.entries.put(key, entry);
        self.size_bytes += size;
        self.puts += 1;
        true
    }

    /// Copy an entry read from the durable store into memory.
    ///
    /// A resident entry at least as new as `entry` wins and is returned
    /// instead, so a store read that finished after a concurrent write never
    /// puts the older row back.
    pub fn warm(&mut self, key: CacheKey, entry: SearchResult) -> SearchResult {
        if let Some(resident) = self.entries.peek(&key)
            && resident.created_at >= entry.created_at
        {
            tracing::debug!(key = %key, "memory already holds a newer search result, skipping warm-up");
            return resident.clone();
        }

        self.insert(key, entry.clone());
        entry
    }

    /// Remove one entry.
    pub fn remove(&mut self, key: &CacheKey) -> Option<SearchResult> {
        let removed = self.entries.pop(key)?;
        self.size_bytes -= removed.size();
        Some(removed)
    }

    /// Remove every resident page of `query`. Returns how many were removed.
    pub fn remove_query(&mut self, query: &str) -> usize {
        let keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.query == query)
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = 0;
        for key in &keys {
            if self.remove(key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.size_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total payload bytes currently resident.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            puts: self.puts,
            evictions: self.evictions,
            entries: self.entries.len(),
            size_bytes: self.size_bytes,
            budget_bytes: self.budget_bytes,
        }
    }
}
