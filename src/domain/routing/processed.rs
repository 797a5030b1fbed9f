//! Routed signal record.

use serde::Serialize;

use crate::domain::foundation::{SignalId, UnitScore};
use crate::domain::scoring::{EventType, RecencyScore, SourceQuality, SourceTier, UrgencyAssessment};
use crate::domain::signal::{ConfidenceLevel, Pipeline, ProfileType, RawSignal, SignalCategory};

/// A raw signal plus everything the router derived from it.
///
/// Created by the router and read-only downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSignal {
    pub signal: RawSignal,
    pub profile_type: ProfileType,
    pub category: SignalCategory,
    /// Category pattern matches; zero when the fallback category was used.
    pub match_count: usize,
    pub event_type: EventType,
    pub recency: RecencyScore,
    pub source_quality: SourceQuality,
    pub urgency: UrgencyAssessment,
    pub confidence_score: UnitScore,
    pub confidence_level: ConfidenceLevel,
    pub composite_score: UnitScore,
    pub pipeline: Pipeline,
    pub routing_reason: String,
}

impl ProcessedSignal {
    pub fn id(&self) -> &SignalId {
        self.signal.id()
    }

    pub fn recency_score(&self) -> UnitScore {
        self.recency.score
    }

    pub fn source_quality_score(&self) -> UnitScore {
        self.source_quality.multiplier
    }

    pub fn source_tier(&self) -> SourceTier {
        self.source_quality.tier
    }

    pub fn is_fallback(&self) -> bool {
        self.match_count == 0
    }
}
