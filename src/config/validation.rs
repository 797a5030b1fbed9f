//! Guardrail configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::validation::DEFAULT_FIT_THRESHOLD;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ValidationConfig {
    /// Minimum buyer/product-fit score for a trigger to be accepted
    #[serde(default = "default_fit_threshold")]
    pub fit_threshold: f64,
}

fn default_fit_threshold() -> f64 {
    DEFAULT_FIT_THRESHOLD
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fit_threshold: default_fit_threshold(),
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.fit_threshold) {
            return Err(ValidationError::FitThresholdOutOfRange(self.fit_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_must_be_a_unit_value() {
        assert!(ValidationConfig::default().validate().is_ok());
        let config = ValidationConfig { fit_threshold: 1.5 };
        assert_eq!(config.validate(), Err(ValidationError::FitThresholdOutOfRange(1.5)));
    }
}
