//! Synthesizer output shape and parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The only fields a synthesized trigger may carry.
pub const CANDIDATE_FIELDS: [&str; 5] = ["sampleIds", "category", "title", "confidence", "executiveSummary"];

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CandidateParseError {
    #[error("Synthesizer output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Synthesizer output has no trigger list")]
    MissingTriggers,

    #[error("Trigger is malformed: {0}")]
    Malformed(String),
}

/// One trigger as emitted by the synthesizer, after output validation.
///
/// References signals only through `sample_ids`, the 1-based positions in
/// the batch it was shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerCandidate {
    pub sample_ids: Vec<usize>,
    pub category: String,
    pub title: String,
    pub confidence: f64,
    #[serde(default)]
    pub executive_summary: String,
}

impl TriggerCandidate {
    /// Converts a validated JSON object into a typed candidate.
    pub fn from_value(value: &Value) -> Result<Self, CandidateParseError> {
        let candidate: TriggerCandidate =
            serde_json::from_value(value.clone()).map_err(|e| CandidateParseError::Malformed(e.to_string()))?;
        if candidate.title.trim().is_empty() {
            return Err(CandidateParseError::Malformed("title is empty".to_string()));
        }
        Ok(candidate)
    }

    /// Title and summary joined, for text classifiers.
    pub fn text(&self) -> String {
        format!("{}. {}", self.title.trim(), self.executive_summary.trim())
    }
}

/// Splits raw synthesizer text into per-trigger JSON values.
///
/// Accepts `{"triggers": [...]}`, a bare array, or a single object, with or
/// without a surrounding markdown code fence.
pub fn parse_candidates(raw: &str) -> Result<Vec<Value>, CandidateParseError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| CandidateParseError::InvalidJson(e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("triggers") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(CandidateParseError::MissingTriggers),
            None if map.contains_key("sampleIds") || map.contains_key("title") => Ok(vec![Value::Object(map)]),
            None => Err(CandidateParseError::MissingTriggers),
        },
        _ => Err(CandidateParseError::MissingTriggers),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
