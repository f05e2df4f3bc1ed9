//! Search result entries and their SQLite operations.
//!
//! Provides the cached entry type and the durable tier's CRUD functions.

use std::time::Duration;

use super::connection::CacheDb;
use super::key::CacheKey;
use crate::Error;
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// One cached page of search results.
///
/// `payload` is the serialized response exactly as the search backend
/// returned it; decoding is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub query: String,
    pub page: u32,
    pub payload: String,
    /// Milliseconds since the Unix epoch when the entry was built.
    pub created_at: i64,
}

impl SearchResult {
    /// Build an entry stamped with the current time.
    pub fn new(query: impl Into<String>, page: u32, payload: impl Into<String>) -> Self {
        Self { query: query.into(), page, payload: payload.into(), created_at: Utc::now().timestamp_millis() }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(&self.query, self.page)
    }

    /// Bytes this entry charges against the memory budget.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Age of the entry at `now_ms`. Entries stamped in the future have age zero.
    pub fn age_at(&self, now_ms: i64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.created_at).max(0) as u64)
    }

    /// Whether the entry is older than `ttl` at `now_ms`.
    pub fn is_stale_at(&self, ttl: Duration, now_ms: i64) -> bool {
        self.age_at(now_ms) > ttl
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self { query: row.get(0)?, page: row.get(1)?, payload: row.get(2)?, created_at: row.get(3)? })
    }
}

impl CacheDb {
    /// Get the cached result for one page of a query.
    ///
    /// Returns None if the page isn't stored.
    pub async fn get_search_result(&self, query: &str, page: u32) -> Result<Option<SearchResult>, Error> {
        let key = CacheKey::new(query, page);
        self.conn
            .call(move |conn| -> Result<Option<SearchResult>, Error> {
                let mut stmt =
                    conn.prepare("SELECT query, page, payload, created_at FROM search_results WHERE key_hash = ?1")?;

                match stmt.query_row(params![key.as_str()], SearchResult::from_row) {
                    Ok(result) => Ok(Some(result)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get every stored page for a query, ordered by page.
    pub async fn get_search_results(&self, query: &str) -> Result<Vec<SearchResult>, Error> {
        let query = query.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<SearchResult>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT query, page, payload, created_at FROM search_results
                    WHERE query = ?1 ORDER BY page ASC",
                )?;

                let results = stmt
                    .query_map(params![query], SearchResult::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a cached search result.
    ///
    /// Uses UPSERT semantics: a repopulated page replaces both the payload and
    /// the creation time, so a refresh restarts the TTL clock.
    pub async fn upsert_search_result(&self, result: &SearchResult) -> Result<(), Error> {
        let key = result.key();
        let result = result.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO search_results (key_hash, query, page, payload, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(key_hash) DO UPDATE SET
                        payload = excluded.payload,
                        created_at = excluded.created_at",
                    params![key.as_str(), &result.query, result.page, &result.payload, result.created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every stored page for a query.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_search_results(&self, query: &str) -> Result<u64, Error> {
        let query = query.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM search_results WHERE query = ?1", params![query])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
