//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the trigger pipeline.

mod errors;
mod ids;
mod score;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{SignalId, TriggerId, VerifiedSourceId};
pub use score::UnitScore;
pub use timestamp::{deserialize_lenient_timestamp, Timestamp};
