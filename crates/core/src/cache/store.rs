//! Durable tier abstraction.

use super::connection::CacheDb;
use super::search::SearchResult;
use crate::Error;

/// Persistent backing store for search results.
///
/// The store is the source of truth whenever the memory tier misses.
/// Implementations serialize their own writes; the manager never holds its
/// memory lock while awaiting one of these calls.
#[async_trait::async_trait]
pub trait SearchStore: Send + Sync {
    /// Point lookup of one page.
    async fn get(&self, query: &str, page: u32) -> Result<Option<SearchResult>, Error>;

    /// Every stored page for `query`, possibly empty.
    async fn get_all_by_query(&self, query: &str) -> Result<Vec<SearchResult>, Error>;

    /// Insert or replace the entry for its `(query, page)`.
    async fn insert(&self, entry: &SearchResult) -> Result<(), Error>;

    /// Remove every page for `query`, returning how many were removed.
    async fn delete_by_query(&self, query: &str) -> Result<u64, Error>;
}

#[async_trait::async_trait]
impl SearchStore for CacheDb {
    async fn get(&self, query: &str, page: u32) -> Result<Option<SearchResult>, Error> {
        self.get_search_result(query, page).await
    }

    async fn get_all_by_query(&self, query: &str) -> Result<Vec<SearchResult>, Error> {
        self.get_search_results(query).await
    }

    async fn insert(&self, entry: &SearchResult) -> Result<(), Error> {
        self.upsert_search_result(entry).await
    }

    async fn delete_by_query(&self, query: &str) -> Result<u64, Error> {
        self.delete_search_results(query).await
    }
}
