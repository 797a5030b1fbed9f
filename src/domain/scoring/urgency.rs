//! Urgency classification from signal text.
//!
//! Three ordered pattern families (immediate, active, research) raise the
//! score; an anti-urgency family lowers it. The result is nudged by the
//! signal's freshness and bucketed into an [`UrgencyLevel`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::UnitScore;
use crate::domain::profile::{diminishing_score, CompiledUrgency, PatternMatch};

use super::recency::RecencyScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Unknown,
    Browsing,
    Researching,
    Active,
    Immediate,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Unknown => "unknown",
            UrgencyLevel::Browsing => "browsing",
            UrgencyLevel::Researching => "researching",
            UrgencyLevel::Active => "active",
            UrgencyLevel::Immediate => "immediate",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which family a matched indicator came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Immediate,
    Active,
    Research,
    AntiUrgency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgencyIndicator {
    pub kind: IndicatorKind,
    #[serde(flatten)]
    pub matched: PatternMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgencyAssessment {
    pub level: UrgencyLevel,
    pub score: UnitScore,
    pub confidence: UnitScore,
    pub indicators: Vec<UrgencyIndicator>,
    /// Implied buying timeline from the strongest positive indicator.
    pub timeline_days: Option<u32>,
    pub rationale: String,
}

/// Score cut-offs and freshness adjustments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrgencyThresholds {
    pub immediate: f64,
    pub active: f64,
    pub researching: f64,
    pub peak_bonus: f64,
    pub stale_penalty: f64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            immediate: 0.8,
            active: 0.5,
            researching: 0.3,
            peak_bonus: 0.10,
            stale_penalty: 0.20,
        }
    }
}

impl UrgencyThresholds {
    pub fn level_for(&self, score: f64) -> UrgencyLevel {
        if score >= self.immediate {
            UrgencyLevel::Immediate
        } else if score >= self.active {
            UrgencyLevel::Active
        } else if score >= self.researching {
            UrgencyLevel::Researching
        } else if score > 0.0 {
            UrgencyLevel::Browsing
        } else {
            UrgencyLevel::Unknown
        }
    }
}

#[derive(Debug, Clone)]
pub struct UrgencyClassifier {
    patterns: CompiledUrgency,
    thresholds: UrgencyThresholds,
}

impl UrgencyClassifier {
    pub fn new(patterns: CompiledUrgency) -> Self {
        Self::with_thresholds(patterns, UrgencyThresholds::default())
    }

    pub fn with_thresholds(patterns: CompiledUrgency, thresholds: UrgencyThresholds) -> Self {
        Self { patterns, thresholds }
    }

    pub fn thresholds(&self) -> &UrgencyThresholds {
        &self.thresholds
    }

    /// Classifies `text`. `recency`, when known, applies the freshness
    /// adjustment: a peak signal gains 10%, a stale one loses 20%.
    pub fn classify(&self, text: &str, recency: Option<&RecencyScore>) -> UrgencyAssessment {
        let mut indicators = Vec::new();
        for (kind, set) in [
            (IndicatorKind::Immediate, &self.patterns.immediate),
            (IndicatorKind::Active, &self.patterns.active),
            (IndicatorKind::Research, &self.patterns.research),
            (IndicatorKind::AntiUrgency, &self.patterns.anti),
        ] {
            indicators.extend(
                set.matches(text)
                    .into_iter()
                    .map(|matched| UrgencyIndicator { kind, matched }),
            );
        }

        let positive: Vec<&UrgencyIndicator> = indicators
            .iter()
            .filter(|i| i.kind != IndicatorKind::AntiUrgency)
            .collect();
        let penalty = diminishing_score(
            indicators
                .iter()
                .filter(|i| i.kind == IndicatorKind::AntiUrgency)
                .map(|i| i.matched.weight),
        );
        let base = diminishing_score(positive.iter().map(|i| i.matched.weight)) - penalty;

        let mut raw = base.clamp(0.0, 1.0);
        if let Some(recency) = recency {
            if recency.is_peak() {
                raw *= 1.0 + self.thresholds.peak_bonus;
            } else if recency.is_stale() {
                raw *= 1.0 - self.thresholds.stale_penalty;
            }
        }
        let score = UnitScore::new(raw);
        let level = self.thresholds.level_for(score.value());

        let strongest = positive
            .iter()
            .max_by(|a, b| a.matched.weight.total_cmp(&b.matched.weight))
            .copied();
        let timeline_days = strongest.and_then(|i| i.matched.implied_days);

        let confidence = if indicators.is_empty() {
            UnitScore::ZERO
        } else {
            let max_weight = indicators
                .iter()
                .map(|i| i.matched.weight)
                .fold(0.0, f64::max);
            let counted = indicators.len().min(3) as f64;
            UnitScore::new(0.4 * max_weight + 0.2 * counted)
        };

        let rationale = rationale(level, strongest, penalty > 0.0);

        UrgencyAssessment {
            level,
            score,
            confidence,
            indicators,
            timeline_days,
            rationale,
        }
    }
}

fn rationale(level: UrgencyLevel, strongest: Option<&UrgencyIndicator>, hedged: bool) -> String {
    let mut line = match strongest {
        Some(indicator) => match indicator.matched.implied_days {
            Some(days) => format!(
                "{}: matched '{}' (implies ~{} day timeline)",
                level, indicator.matched.label, days
            ),
            None => format!("{}: matched '{}'", level, indicator.matched.label),
        },
        None => format!("{}: no urgency indicators", level),
    };
    if hedged {
        line.push_str(", reduced by hedging language");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::CompiledPatterns;
    use crate::domain::scoring::recency::AgeBucket;

    fn classifier() -> UrgencyClassifier {
        UrgencyClassifier::new(CompiledPatterns::builtin().unwrap().urgency)
    }

    fn recency(bucket: AgeBucket) -> RecencyScore {
        RecencyScore {
            score: UnitScore::new(0.5),
            bucket,
            age_days: Some(1.0),
        }
    }

    #[test]
    fn contract_renewal_is_at_least_active() {
        let result = classifier().classify("Our contract is up for renewal and we need options", None);
        assert!(result.level >= UrgencyLevel::Active, "got {:?}", result.level);
        assert_eq!(result.timeline_days, Some(30));
    }

    #[test]
    fn hedging_lowers_score_and_level() {
        let c = classifier();
        let plain = c.classify("Our contract is up for renewal.", None);
        let hedged = c.classify("Our contract is up for renewal. No rush, just curious.", None);

        assert!(hedged.score < plain.score);
        assert_eq!(plain.level, UrgencyLevel::Immediate);
        assert_eq!(hedged.level, UrgencyLevel::Active);
        assert!(hedged.rationale.contains("hedging"));
    }

    #[test]
    fn no_indicators_is_unknown_with_zero_confidence() {
        let result = classifier().classify("The weather was nice today.", None);
        assert_eq!(result.level, UrgencyLevel::Unknown);
        assert_eq!(result.confidence, UnitScore::ZERO);
        assert!(result.timeline_days.is_none());
    }

    #[test]
    fn research_language_is_researching() {
        let result = classifier().classify("Researching CRMs, any thoughts?", None);
        assert_eq!(result.level, UrgencyLevel::Researching);
    }

    #[test]
    fn freshness_adjusts_score() {
        let c = classifier();
        let text = "We are evaluating vendors";
        let neutral = c.classify(text, None);
        let peak = c.classify(text, Some(&recency(AgeBucket::Peak)));
        let stale = c.classify(text, Some(&recency(AgeBucket::Stale)));

        assert!(peak.score > neutral.score);
        assert!(stale.score < neutral.score);
        assert!((stale.score.value() - neutral.score.value() * 0.8).abs() < 1e-9);
    }

    #[test]
    fn rationale_names_pattern_and_timeline() {
        let result = classifier().classify("Need this ASAP", None);
        assert!(result.rationale.starts_with("immediate"));
        assert!(result.rationale.contains("urgent language"));
        assert!(result.rationale.contains("3 day"));
    }

    #[test]
    fn level_thresholds() {
        let t = UrgencyThresholds::default();
        assert_eq!(t.level_for(0.8), UrgencyLevel::Immediate);
        assert_eq!(t.level_for(0.5), UrgencyLevel::Active);
        assert_eq!(t.level_for(0.3), UrgencyLevel::Researching);
        assert_eq!(t.level_for(0.01), UrgencyLevel::Browsing);
        assert_eq!(t.level_for(0.0), UrgencyLevel::Unknown);
    }
}
