//! Signal module - raw third-party evidence and its classification vocabulary.
//!
//! # Module Organization
//!
//! - `raw` - `RawSignal`, the immutable record handed over by acquisition
//! - `profile_type` - business profile types and their routing pipelines
//! - `category` - the twelve signal category families and confidence bands

mod category;
mod profile_type;
mod raw;

pub use category::{ConfidenceLevel, SignalCategory};
pub use profile_type::{Pipeline, ProfileType};
pub use raw::RawSignal;
