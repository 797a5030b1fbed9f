//! Routing configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// YAML file layered over the built-in pattern tables and profiles
    #[serde(default)]
    pub patterns_path: Option<PathBuf>,

    /// Signals returned by routing queries
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Samples offered to the synthesizer per batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_top_n() -> usize {
    20
}

fn default_max_batch_size() -> usize {
    50
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            patterns_path: None,
            top_n: default_top_n(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.top_n == 0 {
            return Err(ValidationError::ZeroLimit("top_n"));
        }
        if self.max_batch_size == 0 {
            return Err(ValidationError::ZeroLimit("max_batch_size"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RoutingConfig::default();
        assert_eq!(config.top_n, 20);
        assert_eq!(config.max_batch_size, 50);
        assert!(config.patterns_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_batch_is_rejected() {
        let config = RoutingConfig {
            max_batch_size: 0,
            ..RoutingConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::ZeroLimit("max_batch_size")));
    }
}
