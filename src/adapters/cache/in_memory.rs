//! In-memory trigger cache with stale-while-revalidate.
//!
//! Entries move through fresh → stale → expired as the clock advances.
//! Stale reads are served immediately and schedule one background refresh
//! per key, using the fetcher registered for that key by `get_or_fetch`.
//! When full, the least-recently-accessed entry is evicted.
//!
//! All state sits behind one async mutex; the cache is single-process.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};
use wildmatch::WildMatchPattern;

use crate::adapters::clock::SystemClock;
use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, FetchError, RefreshFetcher};

use super::entry::{CacheEntry, CacheRead, CacheStats, CacheStatus, EntryInfo, FetchOutcome};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error("invalid cache settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Lifetimes and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Age at which an entry expires.
    pub ttl: Duration,
    /// Age at which an entry turns stale. Always below `ttl`.
    pub stale_threshold: Duration,
    pub max_items: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            stale_threshold: Duration::from_secs(2700),
            max_items: 100,
        }
    }
}

impl CacheSettings {
    pub fn new(ttl: Duration, stale_threshold: Duration, max_items: usize) -> Result<Self, CacheError> {
        let settings = Self {
            ttl,
            stale_threshold,
            max_items,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.stale_threshold >= self.ttl {
            return Err(CacheError::InvalidSettings(format!(
                "stale threshold {:?} must be below ttl {:?}",
                self.stale_threshold, self.ttl
            )));
        }
        if self.max_items == 0 {
            return Err(CacheError::InvalidSettings("max_items must be positive".to_string()));
        }
        Ok(())
    }
}

/// A claimed background refresh. Holding one means the key is in the
/// pending set.
struct RefreshJob<T> {
    key: String,
    fetcher: RefreshFetcher<T>,
    /// Entry version the refresh was started against.
    version: u64,
}

struct CacheState<T> {
    entries: HashMap<String, CacheEntry<T>>,
    fetchers: HashMap<String, RefreshFetcher<T>>,
    pending: HashSet<String>,
    next_version: u64,
    stats: CacheStats,
}

impl<T: Clone> CacheState<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            fetchers: HashMap::new(),
            pending: HashSet::new(),
            next_version: 0,
            stats: CacheStats::default(),
        }
    }

    fn read(&mut self, key: &str, now: Timestamp) -> (CacheRead<T>, Option<RefreshJob<T>>) {
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.misses += 1;
            return (CacheRead::miss(), None);
        };
        entry.touch(now);
        let status = entry.status_at(now);
        let read = CacheRead {
            status,
            data: Some(entry.data.clone()),
        };

        match status {
            CacheStatus::Fresh => self.stats.hits += 1,
            CacheStatus::Stale => {
                self.stats.hits += 1;
                self.stats.stale_hits += 1;
            }
            CacheStatus::Expired | CacheStatus::Miss => self.stats.misses += 1,
        }

        let job = if status == CacheStatus::Stale {
            self.claim_refresh(key)
        } else {
            None
        };
        (read, job)
    }

    fn claim_refresh(&mut self, key: &str) -> Option<RefreshJob<T>> {
        if self.pending.contains(key) {
            return None;
        }
        let fetcher = self.fetchers.get(key)?.clone();
        let version = self.entries.get(key)?.version;
        self.pending.insert(key.to_string());
        Some(RefreshJob {
            key: key.to_string(),
            fetcher,
            version,
        })
    }

    fn insert(&mut self, key: String, data: T, now: Timestamp, settings: &CacheSettings) {
        if !self.entries.contains_key(&key) && self.entries.len() >= settings.max_items {
            let lru = self
                .entries
                .values()
                .min_by_key(|e| (e.last_accessed, e.timestamp))
                .map(|e| e.key.clone());
            if let Some(lru) = lru {
                self.remove(&lru);
                self.stats.evictions += 1;
                debug!(key = %lru, "Evicted least recently accessed cache entry");
            }
        }

        self.next_version += 1;
        let entry = CacheEntry {
            data,
            timestamp: now,
            stale_at: now.plus(settings.stale_threshold),
            expires_at: now.plus(settings.ttl),
            key: key.clone(),
            hits: 0,
            last_accessed: now,
            version: self.next_version,
        };
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.fetchers.remove(key);
        self.entries.remove(key).is_some()
    }

    fn remove_where(&mut self, mut doomed: impl FnMut(&CacheEntry<T>) -> bool) -> usize {
        let keys: Vec<String> = self
            .entries
            .values()
            .filter(|e| doomed(e))
            .map(|e| e.key.clone())
            .collect();
        for key in &keys {
            self.remove(key);
        }
        keys.len()
    }
}

struct Shared<T> {
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState<T>>,
}

/// Stale-while-revalidate cache keyed by strings.
///
/// Cheap to clone; clones share the same entries.
pub struct InMemoryTriggerCache<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for InMemoryTriggerCache<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> InMemoryTriggerCache<T> {
    pub fn new(settings: CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                settings,
                clock,
                state: Mutex::new(CacheState::new()),
            }),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.shared.settings
    }

    fn now(&self) -> Timestamp {
        self.shared.clock.now()
    }

    /// Looks up `key`. A stale read schedules a background refresh if a
    /// fetcher is registered and none is already running for the key.
    pub async fn get(&self, key: &str) -> CacheRead<T> {
        let (read, job) = {
            let mut state = self.shared.state.lock().await;
            state.read(key, self.now())
        };
        if let Some(job) = job {
            self.spawn_refresh(job);
        }
        read
    }

    pub async fn set(&self, key: impl Into<String>, data: T) {
        let now = self.now();
        let mut state = self.shared.state.lock().await;
        state.insert(key.into(), data, now, &self.shared.settings);
    }

    /// Serves fresh or stale data immediately; otherwise awaits `fetcher`.
    ///
    /// The fetcher is registered for later background refreshes. If it
    /// fails while any cached data exists, even expired, that data is
    /// served and the error is reported in the outcome.
    pub async fn get_or_fetch(&self, key: &str, fetcher: RefreshFetcher<T>) -> Result<FetchOutcome<T>, CacheError> {
        self.fetch_through(key, fetcher, None).await
    }

    /// As [`get_or_fetch`](Self::get_or_fetch), giving up on the fetch after `limit`.
    pub async fn get_or_fetch_with_timeout(
        &self,
        key: &str,
        fetcher: RefreshFetcher<T>,
        limit: Duration,
    ) -> Result<FetchOutcome<T>, CacheError> {
        self.fetch_through(key, fetcher, Some(limit)).await
    }

    async fn fetch_through(
        &self,
        key: &str,
        fetcher: RefreshFetcher<T>,
        limit: Option<Duration>,
    ) -> Result<FetchOutcome<T>, CacheError> {
        let (read, job) = {
            let mut state = self.shared.state.lock().await;
            state.fetchers.insert(key.to_string(), Arc::clone(&fetcher));
            state.read(key, self.now())
        };
        if let Some(job) = job {
            self.spawn_refresh(job);
        }

        let status = read.status;
        if status.is_servable() {
            if let Some(data) = read.data {
                return Ok(FetchOutcome {
                    data,
                    status,
                    from_cache: true,
                    fetch_error: None,
                });
            }
        }

        let fetched = match limit {
            Some(limit) => match time::timeout(limit, fetcher()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::TimedOut(limit)),
            },
            None => fetcher().await,
        };

        match fetched {
            Ok(data) => {
                self.set(key, data.clone()).await;
                Ok(FetchOutcome {
                    data,
                    status,
                    from_cache: false,
                    fetch_error: None,
                })
            }
            Err(error) => match read.data {
                Some(data) => {
                    warn!(key = %key, error = %error, "Fetch failed, serving expired cache entry");
                    Ok(FetchOutcome {
                        data,
                        status,
                        from_cache: true,
                        fetch_error: Some(error),
                    })
                }
                None => Err(error.into()),
            },
        }
    }

    fn spawn_refresh(&self, job: RefreshJob<T>) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move { cache.run_refresh(job).await })
    }

    async fn run_refresh(&self, job: RefreshJob<T>) {
        debug!(key = %job.key, "Background refresh started");
        let result = (job.fetcher)().await;

        let now = self.now();
        let mut state = self.shared.state.lock().await;
        state.pending.remove(&job.key);
        match result {
            Ok(data) => {
                let current = state.entries.get(&job.key).map(|e| e.version);
                if current == Some(job.version) {
                    state.insert(job.key.clone(), data, now, &self.shared.settings);
                    state.stats.refreshes += 1;
                    debug!(key = %job.key, "Background refresh stored");
                } else {
                    debug!(key = %job.key, "Background refresh superseded, result discarded");
                }
            }
            Err(error) => {
                state.stats.refresh_failures += 1;
                warn!(key = %job.key, error = %error, "Background refresh failed");
            }
        }
    }

    /// Refreshes up to `limit` stale entries, oldest first, and waits for
    /// them. Keys already refreshing or without a fetcher are skipped.
    /// Returns how many refreshes ran.
    pub async fn refresh_stale_batch(&self, limit: usize) -> usize {
        let jobs: Vec<RefreshJob<T>> = {
            let now = self.now();
            let mut state = self.shared.state.lock().await;
            let mut stale: Vec<(Timestamp, String)> = state
                .entries
                .values()
                .filter(|e| e.status_at(now) == CacheStatus::Stale)
                .filter(|e| state.fetchers.contains_key(&e.key) && !state.pending.contains(&e.key))
                .map(|e| (e.stale_at, e.key.clone()))
                .collect();
            stale.sort();
            stale
                .into_iter()
                .take(limit)
                .filter_map(|(_, key)| state.claim_refresh(&key))
                .collect()
        };

        let count = jobs.len();
        let handles: Vec<JoinHandle<()>> = jobs.into_iter().map(|job| self.spawn_refresh(job)).collect();
        for joined in join_all(handles).await {
            if let Err(error) = joined {
                warn!(error = %error, "Background refresh task aborted");
            }
        }
        count
    }

    /// Removes everything. Returns the number of entries dropped.
    pub async fn clear(&self) -> usize {
        let mut state = self.shared.state.lock().await;
        let count = state.entries.len();
        state.entries.clear();
        state.fetchers.clear();
        count
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.shared.state.lock().await.remove(key)
    }

    pub async fn invalidate_expired(&self) -> usize {
        let now = self.now();
        let mut state = self.shared.state.lock().await;
        state.remove_where(|e| e.status_at(now) == CacheStatus::Expired)
    }

    /// Removes every entry past its stale point, expired ones included.
    pub async fn invalidate_stale(&self) -> usize {
        let now = self.now();
        let mut state = self.shared.state.lock().await;
        state.remove_where(|e| e.status_at(now) != CacheStatus::Fresh)
    }

    /// Removes keys matching a glob where `*` matches any run and `?` one character.
    pub async fn invalidate_pattern(&self, pattern: &str) -> usize {
        let glob = WildMatchPattern::<'*', '?'>::new(pattern);
        let mut state = self.shared.state.lock().await;
        state.remove_where(|e| glob.matches(&e.key))
    }

    /// Removes keys starting with `prefix`, taken literally.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut state = self.shared.state.lock().await;
        state.remove_where(|e| e.key.starts_with(prefix))
    }

    /// Keeps the `n` most recently accessed entries. Returns how many were removed.
    pub async fn keep_most_recent(&self, n: usize) -> usize {
        let mut state = self.shared.state.lock().await;
        let mut by_access: Vec<(Timestamp, String)> = state
            .entries
            .values()
            .map(|e| (e.last_accessed, e.key.clone()))
            .collect();
        by_access.sort_by(|a, b| b.cmp(a));
        let doomed: Vec<String> = by_access.into_iter().skip(n).map(|(_, key)| key).collect();
        for key in &doomed {
            state.remove(key);
        }
        doomed.len()
    }

    pub async fn entry_info(&self, key: &str) -> Option<EntryInfo> {
        let now = self.now();
        let state = self.shared.state.lock().await;
        state.entries.get(key).map(|e| EntryInfo {
            key: e.key.clone(),
            status: e.status_at(now),
            hits: e.hits,
            timestamp: e.timestamp,
            stale_at: e.stale_at,
            expires_at: e.expires_at,
            last_accessed: e.last_accessed,
            refresh_pending: state.pending.contains(key),
        })
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock().await;
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }

    pub async fn len(&self) -> usize {
        self.shared.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.shared.state.lock().await.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of background refreshes currently in flight.
    pub async fn pending_refreshes(&self) -> usize {
        self.shared.state.lock().await.pending.len()
    }
}
