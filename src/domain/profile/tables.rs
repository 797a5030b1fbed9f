//! Pattern tables: the tunable data behind every text classifier.
//!
//! Tables are plain data (`PatternTables`) that can be loaded from YAML,
//! then compiled once into `CompiledPatterns` and shared read-only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::signal::SignalCategory;

use super::defaults;
use super::pattern::{PatternError, PatternRule, PatternSet};

/// Urgency pattern families, strongest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyPatterns {
    pub immediate: Vec<PatternRule>,
    pub active: Vec<PatternRule>,
    pub research: Vec<PatternRule>,
    /// Hedging language; matches subtract from the urgency score.
    pub anti: Vec<PatternRule>,
}

impl Default for UrgencyPatterns {
    fn default() -> Self {
        Self {
            immediate: defaults::immediate_rules(),
            active: defaults::active_rules(),
            research: defaults::research_rules(),
            anti: defaults::anti_urgency_rules(),
        }
    }
}

/// Buyer-journey stage indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyPatterns {
    pub unaware: Vec<PatternRule>,
    pub problem_aware: Vec<PatternRule>,
    pub solution_aware: Vec<PatternRule>,
    pub product_aware: Vec<PatternRule>,
}

impl Default for JourneyPatterns {
    fn default() -> Self {
        Self {
            unaware: defaults::unaware_rules(),
            problem_aware: defaults::problem_aware_rules(),
            solution_aware: defaults::solution_aware_rules(),
            product_aware: defaults::product_aware_rules(),
        }
    }
}

/// All loadable pattern tables.
///
/// Sections missing from a YAML document keep their built-in defaults, and
/// a category listed in `categories` replaces that category's rules only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTables {
    pub categories: BTreeMap<SignalCategory, Vec<PatternRule>>,
    pub urgency: UrgencyPatterns,
    pub journey: JourneyPatterns,
}

impl Default for PatternTables {
    fn default() -> Self {
        let categories = SignalCategory::ALL
            .iter()
            .map(|c| (*c, defaults::category_rules(*c)))
            .collect();
        Self {
            categories,
            urgency: UrgencyPatterns::default(),
            journey: JourneyPatterns::default(),
        }
    }
}

impl PatternTables {
    /// Parses tables from YAML, layering them over the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PatternError> {
        let overrides: PatternTables =
            serde_yaml::from_str(yaml).map_err(|e| PatternError::Parse(e.to_string()))?;
        Ok(Self::default().merged_with(overrides))
    }

    /// Overlays `other` on top of `self`, category by category.
    pub fn merged_with(mut self, other: PatternTables) -> Self {
        for (category, rules) in other.categories {
            self.categories.insert(category, rules);
        }
        self.urgency = other.urgency;
        self.journey = other.journey;
        self
    }

    /// Compiles every table.
    pub fn compile(&self) -> Result<CompiledPatterns, PatternError> {
        let mut categories = Vec::with_capacity(self.categories.len());
        for (category, rules) in &self.categories {
            categories.push((*category, PatternSet::compile(rules)?));
        }
        Ok(CompiledPatterns {
            categories,
            urgency: CompiledUrgency {
                immediate: PatternSet::compile(&self.urgency.immediate)?,
                active: PatternSet::compile(&self.urgency.active)?,
                research: PatternSet::compile(&self.urgency.research)?,
                anti: PatternSet::compile(&self.urgency.anti)?,
            },
            journey: CompiledJourney {
                unaware: PatternSet::compile(&self.journey.unaware)?,
                problem_aware: PatternSet::compile(&self.journey.problem_aware)?,
                solution_aware: PatternSet::compile(&self.journey.solution_aware)?,
                product_aware: PatternSet::compile(&self.journey.product_aware)?,
            },
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompiledUrgency {
    pub immediate: PatternSet,
    pub active: PatternSet,
    pub research: PatternSet,
    pub anti: PatternSet,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledJourney {
    pub unaware: PatternSet,
    pub problem_aware: PatternSet,
    pub solution_aware: PatternSet,
    pub product_aware: PatternSet,
}

/// Compiled, immutable pattern tables.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub categories: Vec<(SignalCategory, PatternSet)>,
    pub urgency: CompiledUrgency,
    pub journey: CompiledJourney,
}

impl CompiledPatterns {
    /// Compiles the built-in tables.
    pub fn builtin() -> Result<Self, PatternError> {
        PatternTables::default().compile()
    }
}
