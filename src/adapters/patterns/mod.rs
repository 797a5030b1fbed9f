//! Pattern table loading.

mod yaml;

pub use yaml::{LoadedPatterns, PatternLoadError, YamlPatternLoader};
