//! Buyer-journey stage classification.

use serde::Serialize;

use crate::domain::profile::CompiledJourney;
use crate::domain::trigger::BuyerJourneyStage;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyClassification {
    pub stage: BuyerJourneyStage,
    /// Summed indicator weight per stage, in stage order.
    pub scores: [(BuyerJourneyStage, f64); 4],
    /// True when no stage clearly won and the default was used.
    pub ambiguous: bool,
}

#[derive(Debug, Clone)]
pub struct JourneyStageClassifier {
    patterns: CompiledJourney,
}

impl JourneyStageClassifier {
    pub fn new(patterns: CompiledJourney) -> Self {
        Self { patterns }
    }

    /// Sums matched indicator weights per stage and picks the heaviest.
    ///
    /// No matches, or a tie for first place, yields `ProblemAware`.
    pub fn classify(&self, text: &str) -> JourneyClassification {
        let weight = |set: &crate::domain::profile::PatternSet| -> f64 {
            set.matches(text).iter().map(|m| m.weight).sum()
        };
        let scores = [
            (BuyerJourneyStage::Unaware, weight(&self.patterns.unaware)),
            (BuyerJourneyStage::ProblemAware, weight(&self.patterns.problem_aware)),
            (BuyerJourneyStage::SolutionAware, weight(&self.patterns.solution_aware)),
            (BuyerJourneyStage::ProductAware, weight(&self.patterns.product_aware)),
        ];

        let top = scores.iter().map(|(_, s)| *s).fold(0.0, f64::max);
        let leaders: Vec<BuyerJourneyStage> = scores
            .iter()
            .filter(|(_, s)| top > 0.0 && (*s - top).abs() < 1e-9)
            .map(|(stage, _)| *stage)
            .collect();

        let (stage, ambiguous) = match leaders.as_slice() {
            [single] => (*single, false),
            _ => (BuyerJourneyStage::default(), true),
        };

        JourneyClassification {
            stage,
            scores,
            ambiguous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::CompiledPatterns;

    fn classifier() -> JourneyStageClassifier {
        JourneyStageClassifier::new(CompiledPatterns::builtin().unwrap().journey)
    }

    #[test]
    fn product_aware_language() {
        let result = classifier().classify("Ready to sign up, asked for pricing and a demo");
        assert_eq!(result.stage, BuyerJourneyStage::ProductAware);
        assert!(!result.ambiguous);
    }

    #[test]
    fn solution_aware_language() {
        let result = classifier().classify("Can anyone recommend alternatives?");
        assert_eq!(result.stage, BuyerJourneyStage::SolutionAware);
    }

    #[test]
    fn no_indicators_defaults_to_problem_aware() {
        let result = classifier().classify("Lovely weather");
        assert_eq!(result.stage, BuyerJourneyStage::ProblemAware);
        assert!(result.ambiguous);
    }
}
