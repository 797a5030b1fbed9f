//! CacheRefresher - periodic background refresh of stale cache entries.
//!
//! Each tick refreshes at most `batch_size` stale entries, so a slow
//! upstream cannot pile work onto a single tick. Stale reads also refresh
//! on their own; this loop catches entries nobody is reading.
//!
//! ## Graceful Shutdown
//!
//! The service listens on a watch channel and exits after the current
//! batch once shutdown is signalled.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::debug;

use super::in_memory::InMemoryTriggerCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRefresherConfig {
    /// How often to scan for stale entries.
    pub interval: Duration,

    /// Maximum refreshes per tick.
    pub batch_size: usize,
}

impl Default for CacheRefresherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            batch_size: 5,
        }
    }
}

impl CacheRefresherConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }
}

pub struct CacheRefresher<T> {
    cache: InMemoryTriggerCache<T>,
    config: CacheRefresherConfig,
}

impl<T: Clone + Send + Sync + 'static> CacheRefresher<T> {
    pub fn new(cache: InMemoryTriggerCache<T>) -> Self {
        Self::with_config(cache, CacheRefresherConfig::default())
    }

    pub fn with_config(cache: InMemoryTriggerCache<T>, config: CacheRefresherConfig) -> Self {
        Self { cache, config }
    }

    /// Runs until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Cache refresher stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }

    /// One tick's worth of refreshes. Returns how many ran.
    pub async fn poll_once(&self) -> usize {
        let refreshed = self.cache.refresh_stale_batch(self.config.batch_size).await;
        if refreshed > 0 {
            debug!(refreshed, "Refreshed stale cache entries");
        }
        refreshed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::{CacheSettings, CacheStatus};
    use crate::adapters::clock::ManualClock;
    use crate::ports::refresh_fetcher;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn stale_cache(keys: &[&str]) -> (InMemoryTriggerCache<u32>, Arc<AtomicUsize>) {
        let clock = ManualClock::default();
        let settings = CacheSettings::new(Duration::from_secs(100), Duration::from_secs(10), 50).unwrap();
        let cache = InMemoryTriggerCache::with_clock(settings, Arc::new(clock.clone()));
        let calls = Arc::new(AtomicUsize::new(0));
        for key in keys {
            let counter = Arc::clone(&calls);
            let fetcher = refresh_fetcher(move || {
                let counter = Arc::clone(&counter);
                async move { Ok(counter.fetch_add(1, Ordering::SeqCst) as u32) }
            });
            cache.get_or_fetch(key, fetcher).await.unwrap();
        }
        clock.advance(Duration::from_secs(11));
        (cache, calls)
    }

    #[tokio::test]
    async fn poll_once_refreshes_at_most_one_batch() {
        let (cache, calls) = stale_cache(&["a", "b", "c", "d"]).await;
        let refresher = CacheRefresher::with_config(cache.clone(), CacheRefresherConfig::default().with_batch_size(3));

        assert_eq!(refresher.poll_once().await, 3);
        assert_eq!(refresher.poll_once().await, 1);
        assert_eq!(refresher.poll_once().await, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 8);
        for key in ["a", "b", "c", "d"] {
            assert_eq!(cache.get(key).await.status, CacheStatus::Fresh);
        }
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let (cache, _) = stale_cache(&["a"]).await;
        let refresher = CacheRefresher::with_config(
            cache.clone(),
            CacheRefresherConfig::default().with_interval(Duration::from_millis(5)),
        );
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { refresher.run(rx).await });
        time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();
        time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();

        assert_eq!(cache.stats().await.refreshes, 1);
    }
}
