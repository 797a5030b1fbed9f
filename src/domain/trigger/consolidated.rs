//! Accepted buying triggers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, TriggerId, UnitScore, VerifiedSourceId};
use crate::domain::signal::SignalCategory;

use super::evidence::EvidenceItem;

/// Where the buyer is in their purchase journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerJourneyStage {
    Unaware,
    ProblemAware,
    SolutionAware,
    ProductAware,
}

impl BuyerJourneyStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuyerJourneyStage::Unaware => "unaware",
            BuyerJourneyStage::ProblemAware => "problem_aware",
            BuyerJourneyStage::SolutionAware => "solution_aware",
            BuyerJourneyStage::ProductAware => "product_aware",
        }
    }
}

impl Default for BuyerJourneyStage {
    fn default() -> Self {
        BuyerJourneyStage::ProblemAware
    }
}

impl fmt::Display for BuyerJourneyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trigger that passed both validators.
///
/// Immutable once accepted. A later scoring pass produces a new trigger
/// rather than editing this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedTrigger {
    id: TriggerId,
    title: String,
    category: SignalCategory,
    confidence: UnitScore,
    evidence: Vec<EvidenceItem>,
    buyer_journey_stage: BuyerJourneyStage,
    executive_summary: String,
    is_time_sensitive: bool,
    fit_score: UnitScore,
    created_at: Timestamp,
}

/// Everything needed to accept a trigger.
#[derive(Debug, Clone)]
pub struct NewTrigger {
    pub title: String,
    pub category: SignalCategory,
    pub confidence: UnitScore,
    pub evidence: Vec<EvidenceItem>,
    pub buyer_journey_stage: BuyerJourneyStage,
    pub executive_summary: String,
    pub is_time_sensitive: bool,
    pub fit_score: UnitScore,
}

impl ConsolidatedTrigger {
    pub fn accept(new: NewTrigger, created_at: Timestamp) -> Self {
        Self {
            id: TriggerId::new(),
            title: new.title,
            category: new.category,
            confidence: new.confidence,
            evidence: new.evidence,
            buyer_journey_stage: new.buyer_journey_stage,
            executive_summary: new.executive_summary,
            is_time_sensitive: new.is_time_sensitive,
            fit_score: new.fit_score,
            created_at,
        }
    }

    pub fn id(&self) -> &TriggerId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> SignalCategory {
        self.category
    }

    pub fn confidence(&self) -> UnitScore {
        self.confidence
    }

    pub fn evidence(&self) -> &[EvidenceItem] {
        &self.evidence
    }

    pub fn buyer_journey_stage(&self) -> BuyerJourneyStage {
        self.buyer_journey_stage
    }

    pub fn executive_summary(&self) -> &str {
        &self.executive_summary
    }

    pub fn is_time_sensitive(&self) -> bool {
        self.is_time_sensitive
    }

    pub fn fit_score(&self) -> UnitScore {
        self.fit_score
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &VerifiedSourceId> {
        self.evidence.iter().map(|e| &e.verified_source_id)
    }

    /// Whether every evidence item resolves through `resolves`.
    ///
    /// A trigger without evidence is never displayable.
    pub fn is_displayable(&self, resolves: impl Fn(&VerifiedSourceId) -> bool) -> bool {
        !self.evidence.is_empty() && self.source_ids().all(resolves)
    }
}
