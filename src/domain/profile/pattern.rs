//! Weighted pattern rules and their compiled form.
//!
//! Every classifier in the pipeline (signal category, urgency tier, buyer
//! journey stage) uses the same technique: an ordered list of
//! `{pattern, weight, implied_days}` rules is matched case-insensitively
//! against text, and the matches are folded into one score with
//! [`diminishing_score`].

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bonus factors applied to the second and third strongest matches.
pub const DIMINISHING_BONUS: [f64; 2] = [0.10, 0.05];

/// Errors raised while compiling a pattern table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatternError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("Pattern '{pattern}' has weight {weight}; weights must be within [0, 1]")]
    InvalidWeight { pattern: String, weight: f64 },

    #[error("Failed to parse pattern tables: {0}")]
    Parse(String),
}

/// One tunable classification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Regular expression, matched case-insensitively.
    pub pattern: String,
    /// Contribution of a match, in `[0, 1]`.
    pub weight: f64,
    /// Buying timeline a match implies, in days.
    #[serde(default)]
    pub implied_days: Option<u32>,
    /// Human-readable name used in rationales; defaults to the pattern.
    #[serde(default)]
    pub label: Option<String>,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>, weight: f64) -> Self {
        Self {
            pattern: pattern.into(),
            weight,
            implied_days: None,
            label: None,
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.implied_days = Some(days);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A rule that matched a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub label: String,
    pub weight: f64,
    pub implied_days: Option<u32>,
    pub matched_text: String,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    regex: Regex,
    rule: PatternRule,
}

/// An ordered, compiled list of pattern rules.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    rules: Vec<CompiledRule>,
}

impl PatternSet {
    /// Compiles rules, rejecting invalid regexes and out-of-range weights.
    pub fn compile(rules: &[PatternRule]) -> Result<Self, PatternError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if !(0.0..=1.0).contains(&rule.weight) {
                return Err(PatternError::InvalidWeight {
                    pattern: rule.pattern.clone(),
                    weight: rule.weight,
                });
            }
            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| PatternError::InvalidRegex {
                    pattern: rule.pattern.clone(),
                    reason: e.to_string(),
                })?;
            compiled.push(CompiledRule {
                regex,
                rule: rule.clone(),
            });
        }
        Ok(Self { rules: compiled })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules that match `text`, in rule order.
    pub fn matches(&self, text: &str) -> Vec<PatternMatch> {
        self.rules
            .iter()
            .filter_map(|compiled| {
                compiled.regex.find(text).map(|m| PatternMatch {
                    label: compiled
                        .rule
                        .label
                        .clone()
                        .unwrap_or_else(|| compiled.rule.pattern.clone()),
                    weight: compiled.rule.weight,
                    implied_days: compiled.rule.implied_days,
                    matched_text: m.as_str().to_string(),
                })
            })
            .collect()
    }
}

/// Folds match weights into one score: the strongest weight plus a
/// diminishing bonus from up to two further matches.
///
/// Not clamped; callers clamp after applying their own adjustments.
pub fn diminishing_score(weights: impl IntoIterator<Item = f64>) -> f64 {
    let mut weights: Vec<f64> = weights.into_iter().collect();
    weights.sort_by(|a, b| b.total_cmp(a));
    let Some(top) = weights.first().copied() else {
        return 0.0;
    };
    weights
        .iter()
        .skip(1)
        .zip(DIMINISHING_BONUS.iter())
        .fold(top, |acc, (w, factor)| acc + w * factor)
}
