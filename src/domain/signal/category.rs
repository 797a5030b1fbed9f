//! Signal categories and confidence bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve signal category families a signal can be routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Complaint,
    RecommendationRequest,
    FeatureComparison,
    SwitchingIntent,
    PainPoint,
    Budget,
    Growth,
    ChurnRisk,
    LifeEvent,
    SeasonalDemand,
    Renewal,
    Expansion,
}

impl SignalCategory {
    /// Every category in declaration order.
    pub const ALL: [SignalCategory; 12] = [
        SignalCategory::Complaint,
        SignalCategory::RecommendationRequest,
        SignalCategory::FeatureComparison,
        SignalCategory::SwitchingIntent,
        SignalCategory::PainPoint,
        SignalCategory::Budget,
        SignalCategory::Growth,
        SignalCategory::ChurnRisk,
        SignalCategory::LifeEvent,
        SignalCategory::SeasonalDemand,
        SignalCategory::Renewal,
        SignalCategory::Expansion,
    ];

    /// Snake-case identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalCategory::Complaint => "complaint",
            SignalCategory::RecommendationRequest => "recommendation_request",
            SignalCategory::FeatureComparison => "feature_comparison",
            SignalCategory::SwitchingIntent => "switching_intent",
            SignalCategory::PainPoint => "pain_point",
            SignalCategory::Budget => "budget",
            SignalCategory::Growth => "growth",
            SignalCategory::ChurnRisk => "churn_risk",
            SignalCategory::LifeEvent => "life_event",
            SignalCategory::SeasonalDemand => "seasonal_demand",
            SignalCategory::Renewal => "renewal",
            SignalCategory::Expansion => "expansion",
        }
    }

    /// Looks up a category by its identifier, tolerating case and dashes.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase().replace(['-', ' '], "_");
        SignalCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence band assigned to a processed signal.
///
/// Ordered so that `Low < Medium < High`, which filtering relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        };
        f.write_str(s)
    }
}
