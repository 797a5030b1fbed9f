//! Logging configuration

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TelemetryConfig {
    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json_logs: bool,

    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            log_level: default_log_level(),
        }
    }
}

impl TelemetryConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        EnvFilter::try_new(&self.log_level)
            .map(|_| ())
            .map_err(|_| ValidationError::InvalidLogFilter(self.log_level.clone()))
    }

    /// `RUST_LOG` when set, otherwise `log_level`.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_valid() {
        let config = TelemetryConfig::default();
        assert!(!config.json_logs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let config = TelemetryConfig {
            json_logs: false,
            log_level: "trigger_guard=notalevel".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
