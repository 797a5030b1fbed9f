//! Business profile types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The kind of business a brand is, which decides routing weights and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    /// Neighbourhood consumer services: salons, restaurants, home repair.
    LocalServiceB2c,
    /// Local business-to-business services: commercial cleaning, managed IT.
    LocalServiceB2b,
    /// Agencies selling to businesses within a region (marketing, staffing).
    RegionalAgency,
    /// Multi-location consumer retail within a region.
    RegionalRetailB2c,
    /// National business software.
    NationalSaasB2b,
    /// National consumer products and e-commerce.
    NationalProductB2c,
}

/// Processing pipeline a profile's signals flow through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    Local,
    Regional,
    Enterprise,
    Consumer,
}

impl ProfileType {
    /// Every profile type, in catalog order.
    pub const ALL: [ProfileType; 6] = [
        ProfileType::LocalServiceB2c,
        ProfileType::LocalServiceB2b,
        ProfileType::RegionalAgency,
        ProfileType::RegionalRetailB2c,
        ProfileType::NationalSaasB2b,
        ProfileType::NationalProductB2c,
    ];

    /// Position in [`ProfileType::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ProfileType::LocalServiceB2c => 0,
            ProfileType::LocalServiceB2b => 1,
            ProfileType::RegionalAgency => 2,
            ProfileType::RegionalRetailB2c => 3,
            ProfileType::NationalSaasB2b => 4,
            ProfileType::NationalProductB2c => 5,
        }
    }

    /// Snake-case identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::LocalServiceB2c => "local_service_b2c",
            ProfileType::LocalServiceB2b => "local_service_b2b",
            ProfileType::RegionalAgency => "regional_agency",
            ProfileType::RegionalRetailB2c => "regional_retail_b2c",
            ProfileType::NationalSaasB2b => "national_saas_b2b",
            ProfileType::NationalProductB2c => "national_product_b2c",
        }
    }

    /// Whether the profile sells to other businesses.
    pub fn is_b2b(&self) -> bool {
        matches!(
            self,
            ProfileType::LocalServiceB2b | ProfileType::RegionalAgency | ProfileType::NationalSaasB2b
        )
    }

    /// Whether geographic filtering applies to this profile at all.
    pub fn is_geographically_scoped(&self) -> bool {
        !matches!(
            self,
            ProfileType::NationalSaasB2b | ProfileType::NationalProductB2c
        )
    }

    /// The routing pipeline for this profile.
    pub fn pipeline(&self) -> Pipeline {
        match self {
            ProfileType::LocalServiceB2c | ProfileType::LocalServiceB2b => Pipeline::Local,
            ProfileType::RegionalAgency | ProfileType::RegionalRetailB2c => Pipeline::Regional,
            ProfileType::NationalSaasB2b => Pipeline::Enterprise,
            ProfileType::NationalProductB2c => Pipeline::Consumer,
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ProfileType::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| ValidationError::invalid_format("profile_type", format!("unknown profile '{}'", s)))
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pipeline::Local => "local",
            Pipeline::Regional => "regional",
            Pipeline::Enterprise => "enterprise",
            Pipeline::Consumer => "consumer",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, profile) in ProfileType::ALL.iter().enumerate() {
            assert_eq!(profile.index(), i);
        }
    }

    #[test]
    fn parses_from_kebab_and_snake_case() {
        assert_eq!(
            "regional-agency".parse::<ProfileType>().unwrap(),
            ProfileType::RegionalAgency
        );
        assert_eq!(
            "NATIONAL_SAAS_B2B".parse::<ProfileType>().unwrap(),
            ProfileType::NationalSaasB2b
        );
        assert!("franchise".parse::<ProfileType>().is_err());
    }

    #[test]
    fn national_profiles_are_not_geographically_scoped() {
        assert!(!ProfileType::NationalSaasB2b.is_geographically_scoped());
        assert!(ProfileType::LocalServiceB2c.is_geographically_scoped());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ProfileType::LocalServiceB2b).unwrap();
        assert_eq!(json, "\"local_service_b2b\"");
    }
}
