//! Trigger module - synthesizer candidates, verified provenance and accepted triggers.

mod candidate;
mod consolidated;
mod evidence;
mod verified_source;

pub use candidate::{parse_candidates, CandidateParseError, TriggerCandidate, CANDIDATE_FIELDS};
pub use consolidated::{BuyerJourneyStage, ConsolidatedTrigger, NewTrigger};
pub use evidence::{EvidenceItem, MAX_QUOTE_CHARS};
pub use verified_source::VerifiedSource;
