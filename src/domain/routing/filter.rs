//! Post-routing selection: filtering, top-N and grouping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::profile::ProfileRoutingConfig;
use crate::domain::signal::{ConfidenceLevel, SignalCategory};

use super::processed::ProcessedSignal;

/// Caller-supplied selection criteria. Every field is optional.
///
/// Also the filter object hashed into trigger cache keys, so it serializes
/// with sorted collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalFilter {
    pub min_confidence: Option<ConfidenceLevel>,
    pub categories: BTreeSet<SignalCategory>,
    /// Overrides the profile's configured regions when non-empty.
    pub regions: Vec<String>,
}

impl SignalFilter {
    pub fn with_min_confidence(mut self, level: ConfidenceLevel) -> Self {
        self.min_confidence = Some(level);
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = SignalCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_regions<S: Into<String>>(mut self, regions: impl IntoIterator<Item = S>) -> Self {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.min_confidence.is_none() && self.categories.is_empty() && self.regions.is_empty()
    }
}

/// Applies `filter` to `signals` under `profile`'s geographic rules.
///
/// Geography only applies to local and regional profiles. Signals without
/// a location are kept, since absence is not evidence of being out of area.
pub fn apply_filter(
    signals: Vec<ProcessedSignal>,
    filter: &SignalFilter,
    profile: &ProfileRoutingConfig,
) -> Vec<ProcessedSignal> {
    let regions = effective_regions(filter, profile);

    signals
        .into_iter()
        .filter(|s| filter.min_confidence.map_or(true, |min| s.confidence_level >= min))
        .filter(|s| filter.categories.is_empty() || filter.categories.contains(&s.category))
        .filter(|s| match (regions, s.signal.location()) {
            (Some(regions), Some(location)) => in_regions(location, regions),
            _ => true,
        })
        .collect()
}

fn effective_regions<'a>(filter: &'a SignalFilter, profile: &'a ProfileRoutingConfig) -> Option<&'a [String]> {
    if !profile.profile_type.is_geographically_scoped() {
        return None;
    }
    if !filter.regions.is_empty() {
        return Some(&filter.regions);
    }
    if profile.geography_active() && !profile.geographic_filter.regions.is_empty() {
        return Some(&profile.geographic_filter.regions);
    }
    None
}

/// Case-insensitive containment in either direction, so "Austin" matches
/// "Austin, TX" and "austin, tx" matches "Austin".
fn in_regions(location: &str, regions: &[String]) -> bool {
    let location = location.trim().to_lowercase();
    regions.iter().any(|region| {
        let region = region.trim().to_lowercase();
        !region.is_empty() && (location.contains(&region) || region.contains(&location))
    })
}

/// The `n` highest composite scores, best first. Ties keep input order.
pub fn top_n(mut signals: Vec<ProcessedSignal>, n: usize) -> Vec<ProcessedSignal> {
    signals.sort_by(|a, b| b.composite_score.value().total_cmp(&a.composite_score.value()));
    signals.truncate(n);
    signals
}

pub fn group_by_category(signals: Vec<ProcessedSignal>) -> BTreeMap<SignalCategory, Vec<ProcessedSignal>> {
    let mut groups: BTreeMap<SignalCategory, Vec<ProcessedSignal>> = BTreeMap::new();
    for signal in signals {
        groups.entry(signal.category).or_default().push(signal);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_matching_is_bidirectional_and_case_insensitive() {
        let regions = vec!["Austin".to_string()];
        assert!(in_regions("Austin, TX", &regions));
        assert!(in_regions("austin", &regions));
        assert!(!in_regions("Dallas, TX", &regions));

        let broad = vec!["austin, tx".to_string()];
        assert!(in_regions("Austin", &broad));
    }

    #[test]
    fn empty_region_never_matches() {
        assert!(!in_regions("Austin", &["  ".to_string()]));
    }

    #[test]
    fn filter_serializes_with_sorted_categories() {
        let a = SignalFilter::default().with_categories([SignalCategory::Renewal, SignalCategory::Budget]);
        let b = SignalFilter::default().with_categories([SignalCategory::Budget, SignalCategory::Renewal]);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
