//! Refresh Fetcher - the callback type the trigger cache stores per key.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Produces a fresh value for one cache key.
///
/// Stored by the cache after a successful `get_or_fetch`, then invoked
/// fire-and-forget for background refreshes.
pub type RefreshFetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

/// Wraps an async closure as a [`RefreshFetcher`].
pub fn refresh_fetcher<T, F, Fut>(f: F) -> RefreshFetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Failed(String),

    #[error("fetch timed out after {0:?}")]
    TimedOut(Duration),
}

impl FetchError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
