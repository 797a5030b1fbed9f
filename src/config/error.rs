//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Cache stale threshold ({stale_secs}s) must be below ttl ({ttl_secs}s)")]
    StaleNotBelowTtl { stale_secs: u64, ttl_secs: u64 },

    #[error("Cache max_items must be positive")]
    ZeroCacheCapacity,

    #[error("Cache refresh_batch_size must be positive")]
    ZeroRefreshBatch,

    #[error("Cache refresh_interval_secs must be positive")]
    ZeroRefreshInterval,

    #[error("Routing {0} must be positive")]
    ZeroLimit(&'static str),

    #[error("Fit threshold must be within [0, 1], got {0}")]
    FitThresholdOutOfRange(f64),

    #[error("Invalid log filter '{0}'")]
    InvalidLogFilter(String),
}
