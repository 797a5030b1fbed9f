//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `TRIGGER_GUARD` prefix
//! and `__` between nested keys. Every value has a default.
//!
//! # Example
//!
//! ```no_run
//! use trigger_guard::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Cache ttl: {}s", config.cache.ttl_secs);
//! ```

mod cache;
mod error;
mod routing;
mod telemetry;
mod validation;

pub use cache::CacheConfig;
pub use error::{ConfigError, ValidationError};
pub use routing::RoutingConfig;
pub use telemetry::TelemetryConfig;
pub use validation::ValidationConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Trigger cache lifetimes, capacity and refresh loop
    #[serde(default)]
    pub cache: CacheConfig,

    /// Pattern file and batch limits
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Guardrail thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Log format and level
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRIGGER_GUARD` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `TRIGGER_GUARD__CACHE__TTL_SECS=3600` -> `cache.ttl_secs = 3600`
    /// - `TRIGGER_GUARD__ROUTING__PATTERNS_PATH=patterns.yaml` -> `routing.patterns_path`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRIGGER_GUARD")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cache.validate()?;
        self.routing.validate()?;
        self.validation.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "TRIGGER_GUARD__CACHE__TTL_SECS",
        "TRIGGER_GUARD__CACHE__STALE_THRESHOLD_SECS",
        "TRIGGER_GUARD__CACHE__MAX_ITEMS",
        "TRIGGER_GUARD__ROUTING__TOP_N",
        "TRIGGER_GUARD__VALIDATION__FIT_THRESHOLD",
        "TRIGGER_GUARD__TELEMETRY__JSON_LOGS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.cache.stale_threshold_secs, 2700);
        assert_eq!(config.routing.top_n, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TRIGGER_GUARD__CACHE__TTL_SECS", "600");
        env::set_var("TRIGGER_GUARD__CACHE__STALE_THRESHOLD_SECS", "300");
        env::set_var("TRIGGER_GUARD__CACHE__MAX_ITEMS", "10");
        env::set_var("TRIGGER_GUARD__ROUTING__TOP_N", "5");
        env::set_var("TRIGGER_GUARD__VALIDATION__FIT_THRESHOLD", "0.55");
        env::set_var("TRIGGER_GUARD__TELEMETRY__JSON_LOGS", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.cache.stale_threshold_secs, 300);
        assert_eq!(config.cache.max_items, 10);
        assert_eq!(config.routing.top_n, 5);
        assert_eq!(config.validation.fit_threshold, 0.55);
        assert!(config.telemetry.json_logs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_validated_rejects_inverted_lifetimes() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TRIGGER_GUARD__CACHE__TTL_SECS", "60");
        env::set_var("TRIGGER_GUARD__CACHE__STALE_THRESHOLD_SECS", "120");
        let result = AppConfig::load_validated();
        clear_env();

        assert!(matches!(
            result,
            Err(ConfigError::ValidationFailed(ValidationError::StaleNotBelowTtl { .. }))
        ));
    }
}
