//! Profile-aware signal routing.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UnitScore};
use crate::domain::profile::{CompiledPatterns, ProfileCatalog, ProfileRoutingConfig};
use crate::domain::scoring::{
    ConfidenceInputs, ConfidenceScorer, EventType, RecencyScorer, SourceQualityScorer, UrgencyClassifier,
};
use crate::domain::signal::{ProfileType, RawSignal, SignalCategory};

use super::category::{CategoryDetection, CategoryDetector};
use super::filter::{apply_filter, group_by_category, top_n, SignalFilter};
use super::processed::ProcessedSignal;

/// Largest additive boost, given to the top-priority category.
pub const MAX_PRIORITY_BOOST: f64 = 0.15;

/// Classifies and scores signals for a business profile.
///
/// Holds only immutable configuration; clone freely or share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ProfileRouter {
    catalog: Arc<ProfileCatalog>,
    detector: CategoryDetector,
    recency: RecencyScorer,
    source_quality: SourceQualityScorer,
    urgency: UrgencyClassifier,
    confidence: ConfidenceScorer,
}

impl ProfileRouter {
    pub fn new(catalog: Arc<ProfileCatalog>, patterns: CompiledPatterns) -> Self {
        Self {
            catalog,
            detector: CategoryDetector::new(patterns.categories),
            recency: RecencyScorer::default(),
            source_quality: SourceQualityScorer::default(),
            urgency: UrgencyClassifier::new(patterns.urgency),
            confidence: ConfidenceScorer::default(),
        }
    }

    pub fn with_recency(mut self, recency: RecencyScorer) -> Self {
        self.recency = recency;
        self
    }

    pub fn with_source_quality(mut self, scorer: SourceQualityScorer) -> Self {
        self.source_quality = scorer;
        self
    }

    pub fn with_confidence(mut self, scorer: ConfidenceScorer) -> Self {
        self.confidence = scorer;
        self
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn profile(&self, profile: ProfileType) -> &ProfileRoutingConfig {
        self.catalog.get(profile)
    }

    pub fn urgency_classifier(&self) -> &UrgencyClassifier {
        &self.urgency
    }

    /// Routes `signals` for `profile` as of now.
    pub fn route(&self, profile: ProfileType, signals: &[RawSignal]) -> Vec<ProcessedSignal> {
        self.route_at(profile, signals, Timestamp::now())
    }

    /// Routes `signals` for `profile` as of `now`. Output order matches input.
    pub fn route_at(&self, profile: ProfileType, signals: &[RawSignal], now: Timestamp) -> Vec<ProcessedSignal> {
        let config = self.catalog.get(profile);
        let processed: Vec<ProcessedSignal> = signals
            .iter()
            .map(|signal| self.process(signal, config, now))
            .collect();

        tracing::debug!(
            profile = %profile,
            signals_in = signals.len(),
            signals_out = processed.len(),
            fallback = processed.iter().filter(|s| s.is_fallback()).count(),
            "Routed signals"
        );
        processed
    }

    fn process(&self, signal: &RawSignal, config: &ProfileRoutingConfig, now: Timestamp) -> ProcessedSignal {
        let detection = self.detector.detect(signal.content(), config);
        let event_type = EventType::infer(signal);
        let recency = self
            .recency
            .score_with_decay(signal.timestamp(), event_type, config.recency_decay_rate, now);
        let source_quality = self.source_quality.score(signal, config);
        let urgency = self.urgency.classify(signal.content(), Some(&recency));

        let seasonal = config.seasonal_boost(detection.category, now.month());
        let priority = priority_weight(config, &detection);
        let composite = UnitScore::new(
            recency.score.value() * source_quality.multiplier.value() * seasonal + MAX_PRIORITY_BOOST * priority,
        );

        let inputs = ConfidenceInputs {
            recency: recency.score,
            tier: source_quality.tier,
            priority: UnitScore::new(priority),
            match_count: detection.match_count(),
            urgency: urgency.score,
            composite,
        };
        let confidence_score = self.confidence.score(&inputs);
        let confidence_level = self.confidence.band(confidence_score, config.confidence_threshold);

        let routing_reason = routing_reason(&detection, config, seasonal, source_quality.tier.as_str());

        ProcessedSignal {
            signal: signal.clone(),
            profile_type: config.profile_type,
            category: detection.category,
            match_count: detection.match_count(),
            event_type,
            recency,
            source_quality,
            urgency,
            confidence_score,
            confidence_level,
            composite_score: composite,
            pipeline: config.profile_type.pipeline(),
            routing_reason,
        }
    }

    /// Applies a [`SignalFilter`] under `profile`'s geographic rules.
    pub fn filter(
        &self,
        profile: ProfileType,
        signals: Vec<ProcessedSignal>,
        filter: &SignalFilter,
    ) -> Vec<ProcessedSignal> {
        apply_filter(signals, filter, self.catalog.get(profile))
    }

    pub fn top_n(&self, signals: Vec<ProcessedSignal>, n: usize) -> Vec<ProcessedSignal> {
        top_n(signals, n)
    }

    pub fn group_by_category(&self, signals: Vec<ProcessedSignal>) -> BTreeMap<SignalCategory, Vec<ProcessedSignal>> {
        group_by_category(signals)
    }
}

/// Priority boost normalised to `[0, 1]`: 1.0 for the first-ranked
/// category, shrinking linearly. Zero for unranked or fallback categories.
fn priority_weight(config: &ProfileRoutingConfig, detection: &CategoryDetection) -> f64 {
    if detection.fallback {
        return 0.0;
    }
    let len = config.category_priorities.len();
    match config.priority_rank(detection.category) {
        Some(rank) if len > 0 => (len - rank) as f64 / len as f64,
        _ => 0.0,
    }
}

fn routing_reason(detection: &CategoryDetection, config: &ProfileRoutingConfig, seasonal: f64, tier: &str) -> String {
    let mut parts = Vec::new();
    if detection.fallback {
        parts.push(format!("no category match, fallback to {}", detection.category));
    } else {
        parts.push(format!("{} ({} matches)", detection.category, detection.match_count()));
    }
    if let Some(rank) = config.priority_rank(detection.category) {
        if !detection.fallback {
            parts.push(format!("priority #{}", rank + 1));
        }
    }
    parts.push(format!("{} source", tier));
    if seasonal > 1.0 {
        parts.push(format!("seasonal x{:.2}", seasonal));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SignalId;
    use crate::domain::signal::{ConfidenceLevel, Pipeline};
    use proptest::prelude::*;

    fn router() -> ProfileRouter {
        ProfileRouter::new(Arc::new(ProfileCatalog::builtin()), CompiledPatterns::builtin().unwrap())
    }

    fn now() -> Timestamp {
        Timestamp::parse_lenient("2024-07-10T12:00:00Z").unwrap()
    }

    fn signal(id: &str, source: &str, content: &str, days_old: i64) -> RawSignal {
        RawSignal::new(SignalId::new(id).unwrap(), source, content, Some(now().minus_days(days_old)))
    }

    #[test]
    fn route_preserves_order_and_assigns_pipeline() {
        let signals = vec![
            signal("a", "g2", "We are switching from our CRM, contract is up for renewal", 1),
            signal("b", "twitter", "nice weather", 1),
        ];
        let processed = router().route_at(ProfileType::NationalSaasB2b, &signals, now());

        assert_eq!(processed.len(), 2);
        assert_eq!(processed[0].id().as_str(), "a");
        assert_eq!(processed[0].pipeline, Pipeline::Enterprise);
        assert!(!processed[0].is_fallback());
        assert!(processed[1].is_fallback());
        assert!(processed[1].routing_reason.contains("fallback"));
    }

    #[test]
    fn fresh_tier1_priority_signal_outranks_stale_unknown_source() {
        let signals = vec![
            signal("stale", "somewhere", "Switching from our vendor", 200),
            signal("fresh", "g2", "Switching from our vendor", 0),
        ];
        let processed = router().route_at(ProfileType::NationalSaasB2b, &signals, now());
        assert!(processed[1].composite_score > processed[0].composite_score);
        assert!(processed[1].confidence_level > processed[0].confidence_level);
    }

    #[test]
    fn seasonal_window_boosts_composite() {
        let catalog = ProfileCatalog::builtin();
        let mut config = catalog.get(ProfileType::LocalServiceB2c).clone();
        config.seasonal_boosts = vec![crate::domain::profile::SeasonalWindow::new(
            SignalCategory::RecommendationRequest,
            7,
            7,
            1.5,
        )
        .unwrap()];
        config.category_priorities.clear();
        let boosted = ProfileRouter::new(
            Arc::new(catalog.clone().with_override(config.clone())),
            CompiledPatterns::builtin().unwrap(),
        );
        config.seasonal_boosts.clear();
        let plain = ProfileRouter::new(
            Arc::new(catalog.with_override(config)),
            CompiledPatterns::builtin().unwrap(),
        );

        let signals = vec![signal("a", "reddit", "Can anyone recommend a roofer?", 3)];
        let with = boosted.route_at(ProfileType::LocalServiceB2c, &signals, now());
        let without = plain.route_at(ProfileType::LocalServiceB2c, &signals, now());

        assert!(with[0].composite_score > without[0].composite_score);
        assert!(with[0].routing_reason.contains("seasonal"));
    }

    #[test]
    fn geography_filter_only_applies_to_scoped_profiles() {
        let r = router();
        let signals = vec![
            signal("austin", "yelp", "Can anyone recommend a plumber?", 1).with_location("Austin, TX"),
            signal("dallas", "yelp", "Can anyone recommend a plumber?", 1).with_location("Dallas, TX"),
            signal("nowhere", "yelp", "Can anyone recommend a plumber?", 1),
        ];
        let filter = SignalFilter::default().with_regions(["austin"]);

        let local = r.route_at(ProfileType::LocalServiceB2c, &signals, now());
        let kept: Vec<_> = r
            .filter(ProfileType::LocalServiceB2c, local, &filter)
            .into_iter()
            .map(|s| s.id().as_str().to_string())
            .collect();
        assert_eq!(kept, vec!["austin", "nowhere"]);

        let national = r.route_at(ProfileType::NationalProductB2c, &signals, now());
        assert_eq!(r.filter(ProfileType::NationalProductB2c, national, &filter).len(), 3);
    }

    #[test]
    fn filter_by_confidence_and_category() {
        let r = router();
        let signals = vec![
            signal("good", "g2", "Budget is approved, need a demo this quarter", 0),
            signal("weak", "unknown", "hmm", 300),
        ];
        let processed = r.route_at(ProfileType::NationalSaasB2b, &signals, now());

        let by_conf = r.filter(
            ProfileType::NationalSaasB2b,
            processed.clone(),
            &SignalFilter::default().with_min_confidence(ConfidenceLevel::Medium),
        );
        assert_eq!(by_conf.len(), 1);
        assert_eq!(by_conf[0].id().as_str(), "good");

        let by_cat = r.filter(
            ProfileType::NationalSaasB2b,
            processed,
            &SignalFilter::default().with_categories([SignalCategory::Budget]),
        );
        assert!(by_cat.iter().all(|s| s.category == SignalCategory::Budget));
    }

    #[test]
    fn top_n_and_grouping() {
        let r = router();
        let signals = vec![
            signal("1", "g2", "Switching from our vendor", 0),
            signal("2", "g2", "Switching from our vendor", 40),
            signal("3", "g2", "Budget is approved", 0),
        ];
        let processed = r.route_at(ProfileType::NationalSaasB2b, &signals, now());
        let top = r.top_n(processed.clone(), 2);
        assert_eq!(top.len(), 2);
        assert!(top[0].composite_score >= top[1].composite_score);
        assert!(top.iter().all(|s| s.id().as_str() != "2"));

        let groups = r.group_by_category(processed);
        assert_eq!(groups[&SignalCategory::SwitchingIntent].len(), 2);
        assert_eq!(groups[&SignalCategory::Budget].len(), 1);
    }

    proptest! {
        #[test]
        fn composite_stays_in_unit_interval(days in -30i64..2000, idx in 0usize..6) {
            let profile = ProfileType::ALL[idx];
            let signals = vec![signal("p", "g2", "Budget is approved, switching from our vendor ASAP", days)];
            let processed = router().route_at(profile, &signals, now());
            let value = processed[0].composite_score.value();
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
