//! Validation module - the guardrails between the synthesizer and anything displayed.
//!
//! # Module Organization
//!
//! - `forbidden` - link, handle and provenance-field patterns
//! - `output` - `OutputValidator`, binary accept/reject of synthesizer output
//! - `uvp` - brand value proposition and product-term extraction
//! - `fit` - `BuyerProductFitValidator`, weighted relevance checks
//! - `journey` - buyer-journey stage classification
//! - `rejection` - typed rejection records

mod fit;
mod forbidden;
mod journey;
mod output;
mod rejection;
mod uvp;

pub use fit::{
    BuyerProductFitValidator, FitCheck, FitCheckOutcome, FitResult, FitWeights, DEFAULT_FIT_THRESHOLD,
};
pub use forbidden::{mask_for_prompt, FORBIDDEN_FIELDS, LEGACY_FIELDS};
pub use journey::{JourneyClassification, JourneyStageClassifier};
pub use output::{OutputValidationResult, OutputValidator, OutputViolation, RejectionStats, ViolationCode};
pub use rejection::{Rejection, RejectionKind};
pub use uvp::{ProductTerms, ValueProposition};
