//! Adapters - Implementations of port interfaces.
//!
//! - `cache` - in-memory trigger cache, its key builder and refresh loop
//! - `clock` - system and manual clocks
//! - `patterns` - YAML pattern-table loading
//! - `registry` - in-memory verified-source registry
//! - `synthesizer` - mock synthesizer for tests and offline runs

pub mod cache;
pub mod clock;
pub mod patterns;
pub mod registry;
pub mod synthesizer;

pub use cache::{
    CacheError, CacheKey, CacheKeyError, CacheRefresher, CacheRefresherConfig, CacheSettings, CacheStats, CacheStatus,
    InMemoryTriggerCache,
};
pub use clock::{ManualClock, SystemClock};
pub use patterns::{LoadedPatterns, PatternLoadError, YamlPatternLoader};
pub use registry::InMemorySourceRegistry;
pub use synthesizer::MockSynthesizer;
