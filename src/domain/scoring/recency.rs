//! Recency scoring: exponential decay by event type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{Timestamp, UnitScore};
use crate::domain::signal::RawSignal;

/// What kind of event a signal reports. Decides how fast it goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SocialMention,
    TrendSpike,
    ForumPost,
    NewsArticle,
    Review,
    JobPosting,
    LeadershipChange,
    FundingRound,
    General,
}

impl EventType {
    /// Default decay constant in days.
    pub fn default_half_life_days(&self) -> f64 {
        match self {
            EventType::SocialMention => 3.0,
            EventType::TrendSpike => 5.0,
            EventType::ForumPost => 7.0,
            EventType::NewsArticle => 14.0,
            EventType::General => 21.0,
            EventType::Review => 30.0,
            EventType::JobPosting => 30.0,
            EventType::LeadershipChange => 60.0,
            EventType::FundingRound => 120.0,
        }
    }

    /// Infers the event type from a signal.
    ///
    /// An explicit `event_type` metadata entry wins; otherwise the source
    /// identifier is matched against well-known platforms.
    pub fn infer(signal: &RawSignal) -> Self {
        if let Some(explicit) = signal.metadata_str("event_type") {
            if let Ok(parsed) = serde_json::from_value(serde_json::Value::String(explicit.to_lowercase())) {
                return parsed;
            }
        }
        Self::from_source(signal.source())
    }

    fn from_source(source: &str) -> Self {
        let source = source.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| source.contains(n));

        if has(&["crunchbase", "pitchbook", "funding"]) {
            EventType::FundingRound
        } else if has(&["trends", "trend"]) {
            EventType::TrendSpike
        } else if has(&["jobs", "indeed", "glassdoor", "hiring"]) {
            EventType::JobPosting
        } else if has(&["news", "press", "rss"]) {
            EventType::NewsArticle
        } else if has(&["review", "yelp", "g2", "capterra", "trustpilot", "trustradius", "clutch", "amazon"]) {
            EventType::Review
        } else if has(&["reddit", "forum", "quora", "hacker", "stackoverflow", "nextdoor"]) {
            EventType::ForumPost
        } else if has(&["twitter", "tiktok", "instagram", "facebook", "linkedin", "threads", "bluesky"]) {
            EventType::SocialMention
        } else {
            EventType::General
        }
    }
}

/// Discrete age bucket derived from the decayed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBucket {
    Peak,
    Normal,
    Stale,
}

/// Result of scoring one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecencyScore {
    pub score: UnitScore,
    pub bucket: AgeBucket,
    /// `None` when the timestamp was missing or malformed.
    pub age_days: Option<f64>,
}

impl RecencyScore {
    pub fn is_peak(&self) -> bool {
        self.bucket == AgeBucket::Peak
    }

    pub fn is_stale(&self) -> bool {
        self.bucket == AgeBucket::Stale
    }
}

/// Tunables for [`RecencyScorer`].
#[derive(Debug, Clone)]
pub struct RecencyConfig {
    /// Per-event overrides of [`EventType::default_half_life_days`].
    pub half_life_overrides: HashMap<EventType, f64>,
    /// Scores at or above this are `Peak`.
    pub peak_threshold: f64,
    /// Scores below this are `Stale`.
    pub stale_threshold: f64,
    /// Score given to signals without a usable timestamp.
    pub missing_timestamp_score: f64,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            half_life_overrides: HashMap::new(),
            peak_threshold: 0.8,
            stale_threshold: 0.2,
            missing_timestamp_score: 0.05,
        }
    }
}

/// Converts a signal's age into a decay-weighted freshness score.
#[derive(Debug, Clone, Default)]
pub struct RecencyScorer {
    config: RecencyConfig,
}

impl RecencyScorer {
    pub fn new(config: RecencyConfig) -> Self {
        Self { config }
    }

    pub fn half_life_days(&self, event: EventType) -> f64 {
        self.config
            .half_life_overrides
            .get(&event)
            .copied()
            .filter(|d| *d > 0.0)
            .unwrap_or_else(|| event.default_half_life_days())
    }

    /// `exp(-age / half_life)`.
    pub fn score(&self, timestamp: Option<Timestamp>, event: EventType, now: Timestamp) -> RecencyScore {
        self.score_with_decay(timestamp, event, 1.0, now)
    }

    /// Like [`score`](Self::score), with the profile's decay rate applied.
    ///
    /// A rate above 1.0 makes signals age faster. Non-positive rates are
    /// treated as 1.0.
    pub fn score_with_decay(
        &self,
        timestamp: Option<Timestamp>,
        event: EventType,
        decay_rate: f64,
        now: Timestamp,
    ) -> RecencyScore {
        let Some(timestamp) = timestamp else {
            let score = UnitScore::new(self.config.missing_timestamp_score);
            return RecencyScore {
                score,
                bucket: self.bucket_for(score),
                age_days: None,
            };
        };

        let rate = if decay_rate > 0.0 { decay_rate } else { 1.0 };
        let age_days = timestamp.age_days_at(&now);
        let half_life = self.half_life_days(event);
        let score = UnitScore::new((-age_days * rate / half_life).exp());

        RecencyScore {
            score,
            bucket: self.bucket_for(score),
            age_days: Some(age_days),
        }
    }

    fn bucket_for(&self, score: UnitScore) -> AgeBucket {
        if score.value() >= self.config.peak_threshold {
            AgeBucket::Peak
        } else if score.value() < self.config.stale_threshold {
            AgeBucket::Stale
        } else {
            AgeBucket::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SignalId;
    use proptest::prelude::*;

    fn now() -> Timestamp {
        Timestamp::parse_lenient("2024-06-15T12:00:00Z").unwrap()
    }

    #[test]
    fn brand_new_signal_scores_one_and_is_peak() {
        let scorer = RecencyScorer::default();
        let result = scorer.score(Some(now()), EventType::SocialMention, now());
        assert_eq!(result.score.value(), 1.0);
        assert!(result.is_peak());
    }

    #[test]
    fn social_mentions_decay_faster_than_funding_rounds() {
        let scorer = RecencyScorer::default();
        let week_old = Some(now().minus_days(7));
        let social = scorer.score(week_old, EventType::SocialMention, now());
        let funding = scorer.score(week_old, EventType::FundingRound, now());

        assert!(social.score < funding.score);
        assert!(social.is_stale());
        assert!(funding.is_peak());
    }

    #[test]
    fn follows_exponential_formula() {
        let scorer = RecencyScorer::default();
        let result = scorer.score(Some(now().minus_days(14)), EventType::NewsArticle, now());
        assert!((result.score.value() - (-1.0f64).exp()).abs() < 1e-9);
        assert_eq!(result.bucket, AgeBucket::Normal);
    }

    #[test]
    fn missing_timestamp_gets_minimum_score() {
        let scorer = RecencyScorer::default();
        let result = scorer.score(None, EventType::Review, now());
        assert_eq!(result.score.value(), 0.05);
        assert!(result.is_stale());
        assert!(result.age_days.is_none());
    }

    #[test]
    fn decay_rate_speeds_up_aging() {
        let scorer = RecencyScorer::default();
        let ts = Some(now().minus_days(10));
        let normal = scorer.score_with_decay(ts, EventType::Review, 1.0, now());
        let fast = scorer.score_with_decay(ts, EventType::Review, 2.0, now());
        assert!(fast.score < normal.score);
    }

    #[test]
    fn half_life_override_is_respected() {
        let mut config = RecencyConfig::default();
        config.half_life_overrides.insert(EventType::Review, 1.0);
        let scorer = RecencyScorer::new(config);
        assert_eq!(scorer.half_life_days(EventType::Review), 1.0);
        assert_eq!(scorer.half_life_days(EventType::NewsArticle), 14.0);
    }

    #[test]
    fn infers_event_type_from_metadata_then_source() {
        let id = SignalId::new("s").unwrap();
        let explicit = RawSignal::new(id.clone(), "reddit", "x", None)
            .with_metadata("event_type", serde_json::json!("funding_round"));
        assert_eq!(EventType::infer(&explicit), EventType::FundingRound);

        let reddit = RawSignal::new(id.clone(), "Reddit", "x", None);
        assert_eq!(EventType::infer(&reddit), EventType::ForumPost);

        let g2 = RawSignal::new(id.clone(), "g2", "x", None);
        assert_eq!(EventType::infer(&g2), EventType::Review);

        let unknown = RawSignal::new(id, "carrier-pigeon", "x", None);
        assert_eq!(EventType::infer(&unknown), EventType::General);
    }

    proptest! {
        #[test]
        fn score_stays_in_unit_interval(age_days in -400i64..4000, rate in -2.0f64..5.0) {
            let scorer = RecencyScorer::default();
            let result = scorer.score_with_decay(
                Some(now().minus_days(age_days)),
                EventType::General,
                rate,
                now(),
            );
            prop_assert!((0.0..=1.0).contains(&result.score.value()));
        }
    }
}
