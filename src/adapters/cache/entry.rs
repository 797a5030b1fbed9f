//! Cache entry and the read-side views of it.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Freshness of a key at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// `now < stale_at`
    Fresh,
    /// `stale_at <= now < expires_at`
    Stale,
    /// `now >= expires_at`
    Expired,
    /// No entry.
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Fresh => "fresh",
            CacheStatus::Stale => "stale",
            CacheStatus::Expired => "expired",
            CacheStatus::Miss => "miss",
        }
    }

    /// Fresh and stale data can be served without waiting on a fetch.
    pub fn is_servable(&self) -> bool {
        matches!(self, CacheStatus::Fresh | CacheStatus::Stale)
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cached value.
///
/// `timestamp <= stale_at < expires_at` holds for every entry; only
/// `hits` and `last_accessed` change after insertion.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: Timestamp,
    pub expires_at: Timestamp,
    pub stale_at: Timestamp,
    pub key: String,
    pub hits: u64,
    pub last_accessed: Timestamp,
    pub(super) version: u64,
}

impl<T> CacheEntry<T> {
    pub fn status_at(&self, now: Timestamp) -> CacheStatus {
        if now.is_before(&self.stale_at) {
            CacheStatus::Fresh
        } else if now.is_before(&self.expires_at) {
            CacheStatus::Stale
        } else {
            CacheStatus::Expired
        }
    }

    pub(super) fn touch(&mut self, now: Timestamp) {
        self.hits += 1;
        self.last_accessed = now;
    }
}

/// Result of a plain `get`. Stale and expired reads still carry the last
/// known data.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead<T> {
    pub status: CacheStatus,
    pub data: Option<T>,
}

impl<T> CacheRead<T> {
    pub fn miss() -> Self {
        Self {
            status: CacheStatus::Miss,
            data: None,
        }
    }
}

/// Result of `get_or_fetch`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome<T> {
    pub data: T,
    /// Status observed before any fetch ran.
    pub status: CacheStatus,
    /// `false` when the fetcher produced `data` during this call.
    pub from_cache: bool,
    /// Set when the fetcher failed and cached data was served instead.
    pub fetch_error: Option<crate::ports::FetchError>,
}

/// Diagnostic view of one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    pub key: String,
    pub status: CacheStatus,
    pub hits: u64,
    pub timestamp: Timestamp,
    pub stale_at: Timestamp,
    pub expires_at: Timestamp,
    pub last_accessed: Timestamp,
    pub refresh_pending: bool,
}

/// Running counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub stale_hits: u64,
    pub evictions: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
