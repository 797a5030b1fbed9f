//! Routing module - profile-aware classification and composite scoring.
//!
//! # Module Organization
//!
//! - `category` - weighted-pattern category detection with fallback
//! - `processed` - `ProcessedSignal`, the router's output record
//! - `router` - `ProfileRouter`, combining every scorer into a composite
//! - `filter` - confidence/category/geography filtering, top-N, grouping

mod category;
mod filter;
mod processed;
mod router;

pub use category::{CategoryDetection, CategoryDetector};
pub use filter::{apply_filter, group_by_category, top_n, SignalFilter};
pub use processed::ProcessedSignal;
pub use router::{ProfileRouter, MAX_PRIORITY_BOOST};
