//! Profile module - routing configuration and tunable pattern tables.
//!
//! Everything here is static data: loaded (or built in) once at startup,
//! compiled, and shared read-only by the scorers, router and validators.

mod catalog;
mod config;
mod defaults;
mod pattern;
mod tables;

pub use catalog::ProfileCatalog;
pub use config::{FitRules, GeographicFilter, ProfileRoutingConfig, SeasonalWindow, SourceTiers};
pub use pattern::{diminishing_score, PatternError, PatternMatch, PatternRule, PatternSet, DIMINISHING_BONUS};
pub use tables::{
    CompiledJourney, CompiledPatterns, CompiledUrgency, JourneyPatterns, PatternTables, UrgencyPatterns,
};
