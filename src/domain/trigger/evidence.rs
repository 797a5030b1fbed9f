//! Displayable evidence backing a trigger.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{UnitScore, VerifiedSourceId};

use super::verified_source::VerifiedSource;

/// Longest quote carried on an evidence item.
pub const MAX_QUOTE_CHARS: usize = 240;

/// One piece of evidence, always tied to a verified source.
///
/// `verified_source_id` is not optional: an item that cannot name its
/// registry record cannot be constructed or deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub quote: String,
    pub platform: String,
    pub relevance: UnitScore,
    pub verified_source_id: VerifiedSourceId,
}

impl EvidenceItem {
    /// Builds evidence from registry data only.
    pub fn from_source(source: &VerifiedSource, relevance: UnitScore) -> Self {
        Self {
            quote: source.excerpt(MAX_QUOTE_CHARS),
            platform: source.platform().to_string(),
            relevance,
            verified_source_id: *source.id(),
        }
    }
}
