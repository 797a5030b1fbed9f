//! Built-in routing configuration for every profile type.

use serde::Deserialize;

use crate::domain::signal::{ProfileType, SignalCategory};

use super::config::{FitRules, GeographicFilter, ProfileRoutingConfig, SeasonalWindow, SourceTiers};
use super::pattern::PatternError;

/// Routing configuration for all profile types, loaded once and shared.
///
/// Always holds exactly one entry per [`ProfileType`]; overrides replace
/// entries rather than adding to them.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: Vec<ProfileRoutingConfig>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    profiles: Vec<ProfileRoutingConfig>,
}

impl ProfileCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            profiles: ProfileType::ALL.iter().map(|p| builtin_profile(*p)).collect(),
        }
    }

    /// Parses a YAML `profiles:` list and layers it over the built-in catalog.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PatternError> {
        let document: CatalogDocument =
            serde_yaml::from_str(yaml).map_err(|e| PatternError::Parse(e.to_string()))?;
        let mut catalog = Self::builtin();
        for profile in document.profiles {
            profile
                .validate()
                .map_err(|e| PatternError::Parse(format!("{}: {}", profile.profile_type, e)))?;
            catalog = catalog.with_override(profile);
        }
        Ok(catalog)
    }

    /// Replaces the configuration for `config.profile_type`.
    pub fn with_override(mut self, config: ProfileRoutingConfig) -> Self {
        let index = config.profile_type.index();
        self.profiles[index] = config;
        self
    }

    pub fn get(&self, profile: ProfileType) -> &ProfileRoutingConfig {
        &self.profiles[profile.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfileRoutingConfig> {
        self.profiles.iter()
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn window(category: SignalCategory, start_month: u32, end_month: u32, boost: f64) -> SeasonalWindow {
    SeasonalWindow {
        category,
        start_month,
        end_month,
        boost,
    }
}

fn builtin_profile(profile: ProfileType) -> ProfileRoutingConfig {
    use SignalCategory::*;

    match profile {
        ProfileType::LocalServiceB2c => ProfileRoutingConfig {
            profile_type: profile,
            source_tiers: SourceTiers {
                tier1: strings(&["google_reviews", "google reviews", "yelp", "nextdoor"]),
                tier2: strings(&["facebook", "reddit", "angi", "thumbtack"]),
                tier3: strings(&["instagram", "tiktok", "twitter", "forum"]),
            },
            category_priorities: vec![
                RecommendationRequest,
                Complaint,
                LifeEvent,
                SeasonalDemand,
                SwitchingIntent,
                PainPoint,
            ],
            confidence_threshold: 0.35,
            recency_decay_rate: 1.5,
            geographic_filter: GeographicFilter {
                enabled: true,
                regions: Vec::new(),
            },
            seasonal_boosts: vec![
                window(SeasonalDemand, 3, 5, 1.2),
                window(LifeEvent, 5, 8, 1.15),
            ],
            fallback_category: PainPoint,
            fit: FitRules {
                buyer_personas: strings(&[
                    "homeowner", "renter", "parent", "family", "neighbor", "customer", "resident",
                ]),
                valid_pain_patterns: strings(&[
                    "no-show", "no show", "showed up late", "overcharged", "booked up", "can't get an appointment",
                    "long wait", "poor workmanship",
                ]),
                invalid_pain_patterns: strings(&["enterprise software", "api limits", "procurement"]),
                invalid_product_categories: strings(&["saas", "enterprise software", "crm"]),
            },
        },
        ProfileType::LocalServiceB2b => ProfileRoutingConfig {
            profile_type: profile,
            source_tiers: SourceTiers {
                tier1: strings(&["linkedin", "google_reviews", "bbb"]),
                tier2: strings(&["reddit", "nextdoor", "facebook"]),
                tier3: strings(&["twitter", "forum"]),
            },
            category_priorities: vec![
                SwitchingIntent,
                Renewal,
                Complaint,
                Expansion,
                RecommendationRequest,
                Budget,
            ],
            confidence_threshold: 0.5,
            recency_decay_rate: 1.0,
            geographic_filter: GeographicFilter {
                enabled: true,
                regions: Vec::new(),
            },
            seasonal_boosts: vec![window(Budget, 1, 1, 1.15), window(Renewal, 12, 1, 1.2)],
            fallback_category: PainPoint,
            fit: FitRules {
                buyer_personas: strings(&[
                    "office manager", "facilities manager", "operations manager", "business owner",
                    "property manager", "practice manager",
                ]),
                valid_pain_patterns: strings(&[
                    "missed cleaning", "downtime", "slow response", "not responding", "contract terms",
                    "unreliable service",
                ]),
                invalid_pain_patterns: strings(&["skincare", "dating", "recipe"]),
                invalid_product_categories: strings(&["consumer app", "video game", "fashion"]),
            },
        },
        ProfileType::RegionalAgency => ProfileRoutingConfig {
            profile_type: profile,
            source_tiers: SourceTiers {
                tier1: strings(&["linkedin", "clutch", "g2"]),
                tier2: strings(&["reddit", "upwork", "google_reviews"]),
                tier3: strings(&["twitter", "facebook", "forum"]),
            },
            category_priorities: vec![
                SwitchingIntent,
                Growth,
                RecommendationRequest,
                Budget,
                PainPoint,
                Expansion,
            ],
            confidence_threshold: 0.55,
            recency_decay_rate: 1.0,
            geographic_filter: GeographicFilter {
                enabled: true,
                regions: Vec::new(),
            },
            seasonal_boosts: vec![window(Budget, 1, 2, 1.2), window(Budget, 10, 11, 1.2)],
            fallback_category: PainPoint,
            fit: FitRules {
                buyer_personas: strings(&[
                    "marketing director", "marketing manager", "head of marketing", "cmo", "founder",
                    "business owner", "small business owner", "marketing team",
                ]),
                valid_pain_patterns: strings(&[
                    "not enough leads", "leads dried up", "lead generation", "website traffic", "low traffic",
                    "seo ranking", "ranking on google", "ad spend", "cost per lead", "brand awareness",
                    "conversion rate", "social media engagement",
                ]),
                invalid_pain_patterns: strings(&[
                    "reconcil", "bookkeeping", "payroll", "tax filing", "invoice errors", "accounts payable",
                    "quickbooks",
                ]),
                invalid_product_categories: strings(&[
                    "accounting software", "accounting", "bookkeeping", "payroll", "tax preparation",
                ]),
            },
        },
        ProfileType::RegionalRetailB2c => ProfileRoutingConfig {
            profile_type: profile,
            source_tiers: SourceTiers {
                tier1: strings(&["google_reviews", "yelp"]),
                tier2: strings(&["facebook", "instagram", "reddit"]),
                tier3: strings(&["tiktok", "twitter", "forum"]),
            },
            category_priorities: vec![
                SeasonalDemand,
                RecommendationRequest,
                Complaint,
                LifeEvent,
                FeatureComparison,
            ],
            confidence_threshold: 0.38,
            recency_decay_rate: 1.3,
            geographic_filter: GeographicFilter {
                enabled: true,
                regions: Vec::new(),
            },
            seasonal_boosts: vec![
                window(SeasonalDemand, 11, 12, 1.3),
                window(SeasonalDemand, 8, 9, 1.15),
            ],
            fallback_category: RecommendationRequest,
            fit: FitRules {
                buyer_personas: strings(&["shopper", "customer", "parent", "gift", "family"]),
                valid_pain_patterns: strings(&[
                    "out of stock", "sold out", "long lines", "can't find", "return policy", "price match",
                ]),
                invalid_pain_patterns: strings(&["server outage", "api", "compliance audit"]),
                invalid_product_categories: strings(&["saas", "b2b software", "consulting"]),
            },
        },
        ProfileType::NationalSaasB2b => ProfileRoutingConfig {
            profile_type: profile,
            source_tiers: SourceTiers {
                tier1: strings(&["g2", "capterra", "trustradius", "gartner"]),
                tier2: strings(&["linkedin", "reddit", "hacker news", "hackernews", "stackoverflow"]),
                tier3: strings(&["twitter", "producthunt", "forum"]),
            },
            category_priorities: vec![
                SwitchingIntent,
                Renewal,
                ChurnRisk,
                FeatureComparison,
                Budget,
                Expansion,
                Growth,
            ],
            confidence_threshold: 0.6,
            recency_decay_rate: 0.7,
            geographic_filter: GeographicFilter::default(),
            seasonal_boosts: vec![window(Renewal, 10, 12, 1.2), window(Budget, 1, 2, 1.15)],
            fallback_category: PainPoint,
            fit: FitRules {
                buyer_personas: strings(&[
                    "cto", "cio", "vp of engineering", "head of sales", "revops", "sales ops", "operations lead",
                    "it director", "engineering manager", "procurement",
                ]),
                valid_pain_patterns: strings(&[
                    "manual data entry", "doesn't integrate", "no integration", "reporting is slow", "slow reporting",
                    "too many tools", "seat pricing", "api limits", "data silos",
                ]),
                invalid_pain_patterns: strings(&["haircut", "plumbing leak", "restaurant reservation"]),
                invalid_product_categories: strings(&["restaurant", "salon", "plumbing", "landscaping"]),
            },
        },
        ProfileType::NationalProductB2c => ProfileRoutingConfig {
            profile_type: profile,
            source_tiers: SourceTiers {
                tier1: strings(&["trustpilot", "amazon", "consumer reports"]),
                tier2: strings(&["reddit", "youtube", "instagram"]),
                tier3: strings(&["tiktok", "twitter", "facebook", "forum"]),
            },
            category_priorities: vec![
                FeatureComparison,
                RecommendationRequest,
                Complaint,
                SeasonalDemand,
                SwitchingIntent,
            ],
            confidence_threshold: 0.35,
            recency_decay_rate: 1.2,
            geographic_filter: GeographicFilter::default(),
            seasonal_boosts: vec![window(SeasonalDemand, 11, 12, 1.3)],
            fallback_category: RecommendationRequest,
            fit: FitRules {
                buyer_personas: strings(&["customer", "buyer", "parent", "gamer", "runner", "home cook", "shopper"]),
                valid_pain_patterns: strings(&[
                    "broke after", "stopped working", "battery life", "too expensive", "poor quality", "doesn't fit",
                ]),
                invalid_pain_patterns: strings(&["sales pipeline", "erp migration", "payroll"]),
                invalid_product_categories: strings(&["erp", "crm", "payroll software"]),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_one_valid_entry_per_profile() {
        let catalog = ProfileCatalog::builtin();
        for profile in ProfileType::ALL {
            let config = catalog.get(profile);
            assert_eq!(config.profile_type, profile);
            assert!(config.validate().is_ok(), "{} invalid", profile);
            assert!(!config.category_priorities.is_empty());
            assert!(!config.fit.buyer_personas.is_empty());
        }
    }

    #[test]
    fn b2b_profiles_have_higher_confidence_bars_than_consumer_profiles() {
        let catalog = ProfileCatalog::builtin();
        let saas = catalog.get(ProfileType::NationalSaasB2b).confidence_threshold;
        let consumer = catalog.get(ProfileType::NationalProductB2c).confidence_threshold;
        assert!(saas - consumer >= 0.2);
    }

    #[test]
    fn yaml_override_replaces_a_single_profile() {
        let yaml = r#"
profiles:
  - profile_type: regional_agency
    confidence_threshold: 0.7
    geographic_filter:
      enabled: true
      regions: ["Austin", "TX"]
"#;
        let catalog = ProfileCatalog::from_yaml_str(yaml).unwrap();
        let agency = catalog.get(ProfileType::RegionalAgency);
        assert_eq!(agency.confidence_threshold, 0.7);
        assert_eq!(agency.geographic_filter.regions, vec!["Austin", "TX"]);
        assert_eq!(agency.fallback_category, SignalCategory::PainPoint);
        assert_eq!(
            catalog.get(ProfileType::NationalSaasB2b),
            ProfileCatalog::builtin().get(ProfileType::NationalSaasB2b)
        );
    }

    #[test]
    fn yaml_override_with_out_of_range_threshold_is_rejected() {
        let yaml = r#"
profiles:
  - profile_type: local_service_b2c
    confidence_threshold: 1.4
"#;
        assert!(ProfileCatalog::from_yaml_str(yaml).is_err());
    }
}
