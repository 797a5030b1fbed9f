//! Scoring module - pure, independently constructible signal scorers.
//!
//! None of these hold mutable state; one instance can be shared across any
//! number of workers.

mod confidence;
mod recency;
mod source_quality;
mod urgency;

pub use confidence::{ConfidenceInputs, ConfidenceScorer, ConfidenceWeights};
pub use recency::{AgeBucket, EventType, RecencyConfig, RecencyScore, RecencyScorer};
pub use source_quality::{SourceQuality, SourceQualityScorer, SourceTier, TierMatch, TierWeights};
pub use urgency::{
    IndicatorKind, UrgencyAssessment, UrgencyClassifier, UrgencyIndicator, UrgencyLevel, UrgencyThresholds,
};
