//! Per-profile routing configuration.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;
use crate::domain::signal::{ProfileType, SignalCategory};

/// Source identifiers per trust tier. Matching is case-insensitive containment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTiers {
    pub tier1: Vec<String>,
    pub tier2: Vec<String>,
    pub tier3: Vec<String>,
}

/// Regions a local or regional profile cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographicFilter {
    pub enabled: bool,
    pub regions: Vec<String>,
}

/// A calendar window during which one category's signals are boosted.
///
/// Windows may wrap the year end (`start_month = 11, end_month = 2`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalWindow {
    pub category: SignalCategory,
    pub start_month: u32,
    pub end_month: u32,
    /// Multiplier applied to the composite base score, `>= 1.0`.
    pub boost: f64,
}

impl SeasonalWindow {
    pub fn new(
        category: SignalCategory,
        start_month: u32,
        end_month: u32,
        boost: f64,
    ) -> Result<Self, ValidationError> {
        for (field, month) in [("start_month", start_month), ("end_month", end_month)] {
            if !(1..=12).contains(&month) {
                return Err(ValidationError::out_of_range(field, 1.0, 12.0, f64::from(month)));
            }
        }
        if boost < 1.0 {
            return Err(ValidationError::out_of_range("boost", 1.0, f64::MAX, boost));
        }
        Ok(Self {
            category,
            start_month,
            end_month,
            boost,
        })
    }

    /// Whether `month` (1-12) falls inside the window.
    pub fn contains(&self, month: u32) -> bool {
        if self.start_month <= self.end_month {
            (self.start_month..=self.end_month).contains(&month)
        } else {
            month >= self.start_month || month <= self.end_month
        }
    }
}

/// Term lists the buyer/product-fit validator checks triggers against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitRules {
    /// Who buys from this kind of business.
    pub buyer_personas: Vec<String>,
    /// Specific pains this kind of business solves.
    pub valid_pain_patterns: Vec<String>,
    /// Pains that look similar but belong to another kind of business.
    pub invalid_pain_patterns: Vec<String>,
    /// Product categories this kind of business never sells.
    pub invalid_product_categories: Vec<String>,
}

/// Static routing configuration for one profile type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRoutingConfig {
    pub profile_type: ProfileType,
    #[serde(default)]
    pub source_tiers: SourceTiers,
    /// Highest priority first.
    #[serde(default)]
    pub category_priorities: Vec<SignalCategory>,
    /// Base confidence bar; confidence bands are placed relative to it.
    pub confidence_threshold: f64,
    /// Multiplier on recency decay speed; `> 1.0` ages signals faster.
    #[serde(default = "default_decay_rate")]
    pub recency_decay_rate: f64,
    #[serde(default)]
    pub geographic_filter: GeographicFilter,
    #[serde(default)]
    pub seasonal_boosts: Vec<SeasonalWindow>,
    /// Category assigned when no category pattern matches.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: SignalCategory,
    #[serde(default)]
    pub fit: FitRules,
}

fn default_decay_rate() -> f64 {
    1.0
}

fn default_fallback_category() -> SignalCategory {
    SignalCategory::PainPoint
}

impl ProfileRoutingConfig {
    /// Zero-based rank of `category` in the priority list.
    pub fn priority_rank(&self, category: SignalCategory) -> Option<usize> {
        self.category_priorities.iter().position(|c| *c == category)
    }

    /// Seasonal multiplier for `category` in `month`; 1.0 outside every window.
    ///
    /// Overlapping windows do not stack; the largest boost wins.
    pub fn seasonal_boost(&self, category: SignalCategory, month: u32) -> f64 {
        self.seasonal_boosts
            .iter()
            .filter(|w| w.category == category && w.contains(month))
            .map(|w| w.boost)
            .fold(1.0, f64::max)
    }

    /// Whether geographic filtering is in force for this profile.
    pub fn geography_active(&self) -> bool {
        self.profile_type.is_geographically_scoped() && self.geographic_filter.enabled
    }

    /// Checks numeric ranges on configuration loaded from outside the binary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ValidationError::out_of_range(
                "confidence_threshold",
                0.0,
                1.0,
                self.confidence_threshold,
            ));
        }
        if !(self.recency_decay_rate > 0.0) {
            return Err(ValidationError::invalid_format(
                "recency_decay_rate",
                "must be greater than zero",
            ));
        }
        for window in &self.seasonal_boosts {
            SeasonalWindow::new(window.category, window.start_month, window.end_month, window.boost)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_windows(windows: Vec<SeasonalWindow>) -> ProfileRoutingConfig {
        ProfileRoutingConfig {
            profile_type: ProfileType::LocalServiceB2c,
            source_tiers: SourceTiers::default(),
            category_priorities: vec![SignalCategory::Budget, SignalCategory::Complaint],
            confidence_threshold: 0.4,
            recency_decay_rate: 1.0,
            geographic_filter: GeographicFilter::default(),
            seasonal_boosts: windows,
            fallback_category: SignalCategory::PainPoint,
            fit: FitRules::default(),
        }
    }

    #[test]
    fn seasonal_window_rejects_bad_months() {
        assert!(SeasonalWindow::new(SignalCategory::Budget, 0, 3, 1.2).is_err());
        assert!(SeasonalWindow::new(SignalCategory::Budget, 3, 13, 1.2).is_err());
        assert!(SeasonalWindow::new(SignalCategory::Budget, 3, 4, 0.9).is_err());
    }

    #[test]
    fn seasonal_window_wraps_year_end() {
        let window = SeasonalWindow::new(SignalCategory::SeasonalDemand, 11, 2, 1.3).unwrap();
        assert!(window.contains(12));
        assert!(window.contains(1));
        assert!(!window.contains(6));
    }

    #[test]
    fn seasonal_boost_takes_largest_overlapping_window() {
        let config = config_with_windows(vec![
            SeasonalWindow::new(SignalCategory::Budget, 1, 3, 1.2).unwrap(),
            SeasonalWindow::new(SignalCategory::Budget, 2, 4, 1.5).unwrap(),
        ]);
        assert_eq!(config.seasonal_boost(SignalCategory::Budget, 2), 1.5);
        assert_eq!(config.seasonal_boost(SignalCategory::Budget, 1), 1.2);
        assert_eq!(config.seasonal_boost(SignalCategory::Budget, 9), 1.0);
        assert_eq!(config.seasonal_boost(SignalCategory::Complaint, 2), 1.0);
    }

    #[test]
    fn priority_rank_follows_list_order() {
        let config = config_with_windows(vec![]);
        assert_eq!(config.priority_rank(SignalCategory::Budget), Some(0));
        assert_eq!(config.priority_rank(SignalCategory::Complaint), Some(1));
        assert_eq!(config.priority_rank(SignalCategory::Growth), None);
    }
}
