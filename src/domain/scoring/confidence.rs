//! Confidence banding relative to a profile's own threshold.

use crate::domain::foundation::UnitScore;
use crate::domain::signal::ConfidenceLevel;

use super::source_quality::SourceTier;

/// Weak signals combined into one confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub recency: UnitScore,
    pub tier: SourceTier,
    /// Category priority boost, already normalised to `[0, 1]`.
    pub priority: UnitScore,
    /// Number of category patterns that matched.
    pub match_count: usize,
    pub urgency: UnitScore,
    pub composite: UnitScore,
}

/// Contribution of each input. Defaults sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceWeights {
    pub recency: f64,
    pub tier: f64,
    pub priority: f64,
    pub matches: f64,
    pub urgency: f64,
    pub composite: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            recency: 0.30,
            tier: 0.20,
            priority: 0.15,
            matches: 0.15,
            urgency: 0.10,
            composite: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    /// Distance above the profile threshold needed for `High`.
    high_margin: f64,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(ConfidenceWeights::default())
    }
}

impl ConfidenceScorer {
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self {
            weights,
            high_margin: 0.2,
        }
    }

    pub fn with_high_margin(mut self, margin: f64) -> Self {
        self.high_margin = margin;
        self
    }

    pub fn score(&self, inputs: &ConfidenceInputs) -> UnitScore {
        let w = &self.weights;
        let tier = match inputs.tier {
            SourceTier::Tier1 => 1.0,
            SourceTier::Tier2 => 0.6,
            SourceTier::Tier3 => 0.25,
        };
        // Three or more matches saturate.
        let matches = (inputs.match_count.min(3) as f64) / 3.0;

        UnitScore::new(
            w.recency * inputs.recency.value()
                + w.tier * tier
                + w.priority * inputs.priority.value()
                + w.matches * matches
                + w.urgency * inputs.urgency.value()
                + w.composite * inputs.composite.value(),
        )
    }

    /// Bands `inputs` against `threshold`, the profile's base confidence bar.
    pub fn level(&self, inputs: &ConfidenceInputs, threshold: f64) -> ConfidenceLevel {
        self.band(self.score(inputs), threshold)
    }

    pub fn band(&self, score: UnitScore, threshold: f64) -> ConfidenceLevel {
        let score = score.value();
        if score >= (threshold + self.high_margin).min(1.0) {
            ConfidenceLevel::High
        } else if score >= threshold {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}
