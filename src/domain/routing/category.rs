//! Signal category detection.

use serde::Serialize;

use crate::domain::profile::{diminishing_score, PatternMatch, PatternSet, ProfileRoutingConfig};
use crate::domain::signal::SignalCategory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDetection {
    pub category: SignalCategory,
    /// Diminishing-bonus score of the winning category's matches.
    pub score: f64,
    pub matches: Vec<PatternMatch>,
    /// True when nothing matched and the profile's fallback was used.
    pub fallback: bool,
}

impl CategoryDetection {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Picks the best-matching category family for a piece of text.
#[derive(Debug, Clone)]
pub struct CategoryDetector {
    categories: Vec<(SignalCategory, PatternSet)>,
}

impl CategoryDetector {
    pub fn new(categories: Vec<(SignalCategory, PatternSet)>) -> Self {
        Self { categories }
    }

    /// Detects the category of `text` for `profile`.
    ///
    /// Equal scores are broken by the profile's category priority, then by
    /// category order. With no match at all, the profile's fallback category
    /// is returned with zero matches.
    pub fn detect(&self, text: &str, profile: &ProfileRoutingConfig) -> CategoryDetection {
        let rank = |c: SignalCategory| profile.priority_rank(c).unwrap_or(usize::MAX);

        let mut best: Option<CategoryDetection> = None;
        for (category, set) in &self.categories {
            let matches = set.matches(text);
            if matches.is_empty() {
                continue;
            }
            let score = diminishing_score(matches.iter().map(|m| m.weight));
            let better = match &best {
                None => true,
                Some(current) => {
                    score > current.score
                        || (score == current.score
                            && (rank(*category), *category) < (rank(current.category), current.category))
                }
            };
            if better {
                best = Some(CategoryDetection {
                    category: *category,
                    score,
                    matches,
                    fallback: false,
                });
            }
        }

        best.unwrap_or(CategoryDetection {
            category: profile.fallback_category,
            score: 0.0,
            matches: Vec::new(),
            fallback: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::{CompiledPatterns, PatternRule, ProfileCatalog};
    use crate::domain::signal::ProfileType;

    fn detector() -> CategoryDetector {
        CategoryDetector::new(CompiledPatterns::builtin().unwrap().categories)
    }

    #[test]
    fn recommendation_request_is_detected() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.get(ProfileType::LocalServiceB2c);
        let result = detector().detect("Can anyone recommend a good plumber nearby?", profile);
        assert_eq!(result.category, SignalCategory::RecommendationRequest);
        assert!(!result.fallback);
        assert!(result.match_count() >= 1);
    }

    #[test]
    fn unmatched_text_uses_fallback_category() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.get(ProfileType::NationalSaasB2b);
        let result = detector().detect("zzz qqq", profile);
        assert_eq!(result.category, profile.fallback_category);
        assert!(result.fallback);
        assert_eq!(result.match_count(), 0);
    }

    #[test]
    fn ties_go_to_higher_priority_category() {
        let set = |p: &str| PatternSet::compile(&[PatternRule::new(p, 0.5)]).unwrap();
        let detector = CategoryDetector::new(vec![
            (SignalCategory::Complaint, set("widget")),
            (SignalCategory::Budget, set("widget")),
        ]);
        let catalog = ProfileCatalog::builtin();
        let mut profile = catalog.get(ProfileType::LocalServiceB2b).clone();
        profile.category_priorities = vec![SignalCategory::Budget, SignalCategory::Complaint];

        assert_eq!(detector.detect("a widget", &profile).category, SignalCategory::Budget);

        profile.category_priorities = vec![SignalCategory::Complaint, SignalCategory::Budget];
        assert_eq!(detector.detect("a widget", &profile).category, SignalCategory::Complaint);
    }
}
