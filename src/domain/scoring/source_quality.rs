//! Source trust tiers.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::foundation::UnitScore;
use crate::domain::profile::ProfileRoutingConfig;
use crate::domain::signal::RawSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Tier1,
    Tier2,
    Tier3,
}

impl SourceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTier::Tier1 => "tier1",
            SourceTier::Tier2 => "tier2",
            SourceTier::Tier3 => "tier3",
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which field of the signal decided the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierMatch {
    Source,
    Platform,
    UrlHost,
    /// Nothing matched; the signal got the lowest tier.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceQuality {
    pub tier: SourceTier,
    pub multiplier: UnitScore,
    pub matched_on: TierMatch,
}

/// Multiplier applied to each tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierWeights {
    pub tier1: f64,
    pub tier2: f64,
    pub tier3: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            tier1: 1.0,
            tier2: 0.8,
            tier3: 0.55,
        }
    }
}

impl TierWeights {
    pub fn multiplier(&self, tier: SourceTier) -> UnitScore {
        UnitScore::new(match tier {
            SourceTier::Tier1 => self.tier1,
            SourceTier::Tier2 => self.tier2,
            SourceTier::Tier3 => self.tier3,
        })
    }
}

/// Maps a signal's origin onto the active profile's tier lists.
#[derive(Debug, Clone, Default)]
pub struct SourceQualityScorer {
    weights: TierWeights,
}

impl SourceQualityScorer {
    pub fn new(weights: TierWeights) -> Self {
        Self { weights }
    }

    /// Scores `signal` for `profile`.
    ///
    /// The source identifier is tried first, then the platform, then the
    /// host part of the URL. Unknown origins get [`SourceTier::Tier3`].
    pub fn score(&self, signal: &RawSignal, profile: &ProfileRoutingConfig) -> SourceQuality {
        let host = signal.url().and_then(url_host);
        let candidates = [
            (Some(signal.source()), TierMatch::Source),
            (signal.platform(), TierMatch::Platform),
            (host.as_deref(), TierMatch::UrlHost),
        ];

        for (origin, matched_on) in candidates {
            let Some(origin) = origin else { continue };
            if let Some(tier) = self.lookup(origin, profile) {
                return SourceQuality {
                    tier,
                    multiplier: self.weights.multiplier(tier),
                    matched_on,
                };
            }
        }

        SourceQuality {
            tier: SourceTier::Tier3,
            multiplier: self.weights.multiplier(SourceTier::Tier3),
            matched_on: TierMatch::Fallback,
        }
    }

    /// Tier lookup for a bare origin string.
    pub fn lookup(&self, origin: &str, profile: &ProfileRoutingConfig) -> Option<SourceTier> {
        let origin = origin.trim().to_lowercase();
        if origin.is_empty() {
            return None;
        }
        let tiers = &profile.source_tiers;
        [
            (SourceTier::Tier1, &tiers.tier1),
            (SourceTier::Tier2, &tiers.tier2),
            (SourceTier::Tier3, &tiers.tier3),
        ]
        .into_iter()
        .find(|(_, names)| {
            names
                .iter()
                .any(|name| !name.is_empty() && origin.contains(&name.to_lowercase()))
        })
        .map(|(tier, _)| tier)
    }
}

/// Host of a signal URL, lowercased with any `www.` dropped.
///
/// `https://www.g2.com/products/x` → `g2.com`. Scheme-less links such as
/// `g2.com/reviews` are read as https.
fn url_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = match Url::parse(raw) {
        Ok(url) if url.has_host() => url,
        _ if !raw.contains("://") => Url::parse(&format!("https://{}", raw)).ok()?,
        _ => return None,
    };
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    (!host.is_empty()).then_some(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SignalId;
    use crate::domain::profile::ProfileCatalog;
    use crate::domain::signal::ProfileType;

    fn signal(source: &str) -> RawSignal {
        RawSignal::new(SignalId::new("s1").unwrap(), source, "text", None)
    }

    #[test]
    fn known_source_maps_to_configured_tier() {
        let catalog = ProfileCatalog::builtin();
        let saas = catalog.get(ProfileType::NationalSaasB2b);
        let scorer = SourceQualityScorer::default();

        let result = scorer.score(&signal("G2"), saas);
        assert_eq!(result.tier, SourceTier::Tier1);
        assert_eq!(result.multiplier.value(), 1.0);
        assert_eq!(result.matched_on, TierMatch::Source);
    }

    #[test]
    fn same_source_scores_differently_per_profile() {
        let catalog = ProfileCatalog::builtin();
        let scorer = SourceQualityScorer::default();
        let yelp = signal("yelp");

        let local = scorer.score(&yelp, catalog.get(ProfileType::LocalServiceB2c));
        let saas = scorer.score(&yelp, catalog.get(ProfileType::NationalSaasB2b));
        assert!(local.multiplier > saas.multiplier);
    }

    #[test]
    fn unknown_origin_falls_back_to_lowest_tier() {
        let catalog = ProfileCatalog::builtin();
        let scorer = SourceQualityScorer::default();
        let result = scorer.score(&signal("carrier-pigeon"), catalog.get(ProfileType::RegionalAgency));
        assert_eq!(result.tier, SourceTier::Tier3);
        assert_eq!(result.matched_on, TierMatch::Fallback);
    }

    #[test]
    fn url_host_disambiguates_generic_source() {
        let catalog = ProfileCatalog::builtin();
        let scorer = SourceQualityScorer::default();
        let scraped = signal("web").with_url("https://www.capterra.com/p/123/reviews?page=2");
        let result = scorer.score(&scraped, catalog.get(ProfileType::NationalSaasB2b));
        assert_eq!(result.tier, SourceTier::Tier1);
        assert_eq!(result.matched_on, TierMatch::UrlHost);
    }

    #[test]
    fn url_host_strips_scheme_port_and_www() {
        assert_eq!(url_host("https://www.g2.com:443/x").as_deref(), Some("g2.com"));
        assert_eq!(url_host("reddit.com/r/smallbusiness").as_deref(), Some("reddit.com"));
        assert_eq!(url_host("https://"), None);
    }

    #[test]
    fn url_host_follows_authority_rules() {
        assert_eq!(url_host("https://user:pa@ss@g2.com/x").as_deref(), Some("g2.com"));
        assert_eq!(url_host("https://evil.example\\@g2.com/x").as_deref(), Some("evil.example"));
        assert_eq!(url_host("g2.com:8080/reviews").as_deref(), Some("g2.com"));
        assert_eq!(url_host("HTTPS://WWW.Capterra.COM").as_deref(), Some("capterra.com"));
        assert_eq!(url_host("   "), None);
    }
}
