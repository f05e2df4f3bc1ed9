//! Cache key derivation for `(query, page)` pairs.

use std::fmt;

use sha2::{Digest, Sha256};

/// Identity of one cached search page.
///
/// The key is the hex SHA-256 digest of the query, a `\n` separator and the
/// decimal page number. The page never contains the separator, so two
/// different `(query, page)` pairs can't be encoded to the same input even
/// when the query itself contains `\n` or `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a query and page.
    pub fn new(query: &str, page: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update(b"\n");
        hasher.update(page.to_string().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest, also used as the durable tier's primary key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
