//! Buyer/product-fit validation.
//!
//! Guards against keyword collisions: a trigger about invoices is not a
//! marketing agency's opportunity just because it says "business owner".

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::foundation::UnitScore;
use crate::domain::profile::ProfileRoutingConfig;
use crate::domain::trigger::TriggerCandidate;

use super::uvp::{mentions_stem, mentions_word, ValueProposition};

/// Default acceptance bar.
pub const DEFAULT_FIT_THRESHOLD: f64 = 0.4;

static FRUSTRATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(frustrat\w*|hate|hating|annoy\w*|terrible|awful|worst|sick of|fed up|nightmare|useless|rant)\b")
        .expect("valid frustration regex")
});

/// The five fit checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitCheck {
    BuyerPersona,
    ProductCategory,
    Industry,
    SpecificPain,
    NotUnrelatedFrustration,
}

impl FitCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitCheck::BuyerPersona => "buyer_persona",
            FitCheck::ProductCategory => "product_category",
            FitCheck::Industry => "industry",
            FitCheck::SpecificPain => "specific_pain",
            FitCheck::NotUnrelatedFrustration => "not_unrelated_frustration",
        }
    }
}

/// Contribution of each passing check. Defaults sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitWeights {
    pub buyer_persona: f64,
    pub product_category: f64,
    pub industry: f64,
    pub specific_pain: f64,
    pub not_unrelated_frustration: f64,
}

impl Default for FitWeights {
    fn default() -> Self {
        Self {
            buyer_persona: 0.25,
            product_category: 0.25,
            industry: 0.20,
            specific_pain: 0.15,
            not_unrelated_frustration: 0.15,
        }
    }
}

impl FitWeights {
    fn weight(&self, check: FitCheck) -> f64 {
        match check {
            FitCheck::BuyerPersona => self.buyer_persona,
            FitCheck::ProductCategory => self.product_category,
            FitCheck::Industry => self.industry,
            FitCheck::SpecificPain => self.specific_pain,
            FitCheck::NotUnrelatedFrustration => self.not_unrelated_frustration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitCheckOutcome {
    pub check: FitCheck,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub is_valid: bool,
    pub fit_score: UnitScore,
    pub checks: Vec<FitCheckOutcome>,
    pub reasoning: String,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BuyerProductFitValidator {
    weights: FitWeights,
    threshold: f64,
}

impl Default for BuyerProductFitValidator {
    fn default() -> Self {
        Self::new(DEFAULT_FIT_THRESHOLD)
    }
}

impl BuyerProductFitValidator {
    pub fn new(threshold: f64) -> Self {
        Self {
            weights: FitWeights::default(),
            threshold,
        }
    }

    pub fn with_weights(mut self, weights: FitWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn validate_fit(
        &self,
        candidate: &TriggerCandidate,
        uvp: &ValueProposition,
        profile: &ProfileRoutingConfig,
    ) -> FitResult {
        self.validate_text(&candidate.text(), uvp, profile)
    }

    /// Scores free text. Exposed separately so callers can include more
    /// context than the candidate's own title and summary.
    pub fn validate_text(&self, text: &str, uvp: &ValueProposition, profile: &ProfileRoutingConfig) -> FitResult {
        let text = text.to_lowercase();
        let rules = &profile.fit;

        let product_terms = uvp.product_terms();
        let own_product: Vec<&str> = product_terms.found_in(&text);
        let invalid_category = rules
            .invalid_product_categories
            .iter()
            .find(|c| mentions_stem(&text, c));
        let invalid_pain = rules.invalid_pain_patterns.iter().find(|p| mentions_stem(&text, p));
        let industry = uvp.industry_terms().into_iter().find(|t| mentions_word(&text, t));

        let checks = vec![
            self.persona_check(&text, uvp, profile),
            match (invalid_category, own_product.first()) {
                (Some(category), _) => outcome(
                    FitCheck::ProductCategory,
                    false,
                    format!("mentions invalid category '{}'", category),
                ),
                (None, Some(term)) => outcome(FitCheck::ProductCategory, true, format!("mentions '{}'", term)),
                (None, None) => outcome(
                    FitCheck::ProductCategory,
                    false,
                    "no product-category term from the value proposition".to_string(),
                ),
            },
            match &industry {
                Some(term) => outcome(FitCheck::Industry, true, format!("references industry '{}'", term)),
                None => outcome(FitCheck::Industry, false, "industry not referenced".to_string()),
            },
            match (invalid_pain, rules.valid_pain_patterns.iter().find(|p| mentions_stem(&text, p))) {
                (Some(pain), _) => {
                    outcome(FitCheck::SpecificPain, false, format!("invalid pain '{}'", pain))
                }
                (None, Some(pain)) => outcome(FitCheck::SpecificPain, true, format!("specific pain '{}'", pain)),
                (None, None) => outcome(FitCheck::SpecificPain, false, "no specific pain".to_string()),
            },
            {
                let about_other_category = invalid_category.is_some() || invalid_pain.is_some();
                let venting = FRUSTRATION.is_match(&text);
                let anchored = !own_product.is_empty() || industry.is_some();
                if about_other_category && own_product.is_empty() {
                    outcome(
                        FitCheck::NotUnrelatedFrustration,
                        false,
                        "directed at an unrelated product category".to_string(),
                    )
                } else if venting && !anchored {
                    outcome(
                        FitCheck::NotUnrelatedFrustration,
                        false,
                        "frustration with no link to the offering".to_string(),
                    )
                } else {
                    outcome(FitCheck::NotUnrelatedFrustration, true, "related to the offering".to_string())
                }
            },
        ];

        let score: f64 = checks
            .iter()
            .filter(|c| c.passed)
            .map(|c| self.weights.weight(c.check))
            .sum();
        let fit_score = UnitScore::new(score);
        let is_valid = fit_score.value() >= self.threshold;

        let reasoning = checks
            .iter()
            .map(|c| format!("{} {}: {}", if c.passed { "+" } else { "-" }, c.check.as_str(), c.detail))
            .collect::<Vec<_>>()
            .join("; ");
        let rejection_reason = (!is_valid).then(|| {
            let failed: Vec<&str> = checks.iter().filter(|c| !c.passed).map(|c| c.check.as_str()).collect();
            format!(
                "fit score {} below {:.2}; failed {}",
                fit_score,
                self.threshold,
                failed.join(", ")
            )
        });

        FitResult {
            is_valid,
            fit_score,
            checks,
            reasoning,
            rejection_reason,
        }
    }

    fn persona_check(&self, text: &str, uvp: &ValueProposition, profile: &ProfileRoutingConfig) -> FitCheckOutcome {
        if let Some(persona) = profile.fit.buyer_personas.iter().find(|p| mentions_stem(text, p)) {
            return outcome(FitCheck::BuyerPersona, true, format!("persona '{}'", persona));
        }
        if let Some(term) = uvp.target_customer_terms().into_iter().find(|t| mentions_word(text, t)) {
            return outcome(FitCheck::BuyerPersona, true, format!("target customer '{}'", term));
        }
        outcome(FitCheck::BuyerPersona, false, "no buyer persona".to_string())
    }
}

fn outcome(check: FitCheck, passed: bool, detail: String) -> FitCheckOutcome {
    FitCheckOutcome { check, passed, detail }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::ProfileCatalog;
    use crate::domain::signal::ProfileType;

    fn agency_uvp() -> ValueProposition {
        ValueProposition {
            brand_name: "Brightline".into(),
            industry: "Marketing".into(),
            product_category: "Digital marketing agency".into(),
            target_customer: "Growing B2B companies".into(),
            headline: "SEO and paid ads that bring qualified leads".into(),
            description: "SEO, paid ads and content marketing for B2B companies.".into(),
            key_benefits: vec![],
        }
    }

    fn candidate(title: &str, summary: &str) -> TriggerCandidate {
        TriggerCandidate {
            sample_ids: vec![1],
            category: "pain_point".into(),
            title: title.into(),
            confidence: 0.7,
            executive_summary: summary.into(),
        }
    }

    #[test]
    fn on_offering_trigger_with_persona_is_accepted() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.get(ProfileType::RegionalAgency);
        let result = BuyerProductFitValidator::default().validate_fit(
            &candidate(
                "Marketing directors report leads dried up",
                "Several marketing directors say paid ads stopped converting and SEO ranking slipped.",
            ),
            &agency_uvp(),
            profile,
        );
        assert!(result.is_valid, "{}", result.reasoning);
        assert!(result.fit_score.value() >= 0.4);
        assert!(result.rejection_reason.is_none());
    }

    #[test]
    fn accounting_pain_for_marketing_agency_is_rejected() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.get(ProfileType::RegionalAgency);
        let result = BuyerProductFitValidator::default().validate_fit(
            &candidate(
                "Business owners struggling with bookkeeping",
                "Small business owners are frustrated with reconciliation errors in their accounting software.",
            ),
            &agency_uvp(),
            profile,
        );
        assert!(!result.is_valid, "{}", result.reasoning);
        assert!(result.fit_score.value() < 0.4);
        let reason = result.rejection_reason.unwrap();
        assert!(reason.contains("product_category"));
    }

    #[test]
    fn generic_venting_scores_low() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.get(ProfileType::RegionalAgency);
        let result = BuyerProductFitValidator::default().validate_fit(
            &candidate("People hate waiting", "Everyone is fed up with slow lines."),
            &agency_uvp(),
            profile,
        );
        assert!(!result.is_valid);
        let frustration = result
            .checks
            .iter()
            .find(|c| c.check == FitCheck::NotUnrelatedFrustration)
            .unwrap();
        assert!(!frustration.passed);
    }

    #[test]
    fn threshold_is_configurable() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.get(ProfileType::RegionalAgency);
        let trigger = candidate("Founders want more SEO", "Founders asking about SEO.");
        let strict = BuyerProductFitValidator::new(0.95).validate_fit(&trigger, &agency_uvp(), profile);
        let lenient = BuyerProductFitValidator::new(0.3).validate_fit(&trigger, &agency_uvp(), profile);
        assert!(!strict.is_valid);
        assert!(lenient.is_valid);
    }
}
