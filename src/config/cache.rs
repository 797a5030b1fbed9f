//! Trigger cache configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::cache::{CacheRefresherConfig, CacheSettings};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Entry lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Age in seconds after which entries are served stale and refreshed
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold_secs: u64,

    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Background refresh tick in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Maximum refreshes per tick
    #[serde(default = "default_refresh_batch_size")]
    pub refresh_batch_size: usize,
}

fn default_ttl() -> u64 {
    3600
}

fn default_stale_threshold() -> u64 {
    2700
}

fn default_max_items() -> usize {
    100
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_refresh_batch_size() -> usize {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            stale_threshold_secs: default_stale_threshold(),
            max_items: default_max_items(),
            refresh_interval_secs: default_refresh_interval(),
            refresh_batch_size: default_refresh_batch_size(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stale_threshold_secs >= self.ttl_secs {
            return Err(ValidationError::StaleNotBelowTtl {
                stale_secs: self.stale_threshold_secs,
                ttl_secs: self.ttl_secs,
            });
        }
        if self.max_items == 0 {
            return Err(ValidationError::ZeroCacheCapacity);
        }
        if self.refresh_batch_size == 0 {
            return Err(ValidationError::ZeroRefreshBatch);
        }
        if self.refresh_interval_secs == 0 {
            return Err(ValidationError::ZeroRefreshInterval);
        }
        Ok(())
    }

    /// Cache settings. Only meaningful after [`validate`](Self::validate) passes.
    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: Duration::from_secs(self.ttl_secs),
            stale_threshold: Duration::from_secs(self.stale_threshold_secs),
            max_items: self.max_items,
        }
    }

    pub fn refresher(&self) -> CacheRefresherConfig {
        CacheRefresherConfig::default()
            .with_interval(Duration::from_secs(self.refresh_interval_secs))
            .with_batch_size(self.refresh_batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.settings().validate().is_ok());
        assert_eq!(config.refresher().batch_size, 5);
    }

    #[test]
    fn stale_must_be_below_ttl() {
        let config = CacheConfig {
            stale_threshold_secs: 3600,
            ..CacheConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::StaleNotBelowTtl {
                stale_secs: 3600,
                ttl_secs: 3600
            })
        );
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = CacheConfig {
            max_items: 0,
            ..CacheConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::ZeroCacheCapacity));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"ttl_secs": 600, "stale_threshold_secs": 300}"#).unwrap();
        assert_eq!(config.ttl_secs, 600);
        assert_eq!(config.max_items, 100);
    }
}
