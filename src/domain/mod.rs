//! Domain layer containing the guardrail pipeline's pure logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, scores, IDs, errors)
//! - `signal` - Raw signals, profile types and category vocabulary
//! - `profile` - Per-profile routing configuration and pattern tables
//! - `scoring` - Recency, source quality, urgency and confidence scorers
//! - `routing` - Profile router, category detection and filtering
//! - `trigger` - Synthesizer candidates, verified sources, accepted triggers
//! - `validation` - Output (anti-hallucination) and buyer/product-fit validators
//! - `synthesis` - The numbered batch offered to the synthesizer

pub mod foundation;
pub mod profile;
pub mod routing;
pub mod scoring;
pub mod signal;
pub mod synthesis;
pub mod trigger;
pub mod validation;
