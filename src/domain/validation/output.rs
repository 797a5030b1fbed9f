//! Anti-hallucination validation of synthesizer output.
//!
//! Binary accept/reject. Nothing here rewrites or redacts output: a
//! response with one invented link cannot be trusted for the rest.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::trigger::CANDIDATE_FIELDS;

use super::forbidden::{is_forbidden_field, scan_field_names, scan_legacy_arrays, scan_text, LEGACY_FIELDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    UrlDetected,
    WwwDetected,
    DomainDetected,
    HandleDetected,
    ForbiddenField,
    UnexpectedField,
    InvalidSampleId,
    EmptySampleIds,
    MissingSampleIds,
    InvalidJson,
    InvalidConfidence,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::UrlDetected => "url_detected",
            ViolationCode::WwwDetected => "www_detected",
            ViolationCode::DomainDetected => "domain_detected",
            ViolationCode::HandleDetected => "handle_detected",
            ViolationCode::ForbiddenField => "forbidden_field",
            ViolationCode::UnexpectedField => "unexpected_field",
            ViolationCode::InvalidSampleId => "invalid_sample_id",
            ViolationCode::EmptySampleIds => "empty_sample_ids",
            ViolationCode::MissingSampleIds => "missing_sample_ids",
            ViolationCode::InvalidJson => "invalid_json",
            ViolationCode::InvalidConfidence => "invalid_confidence",
        }
    }

    /// Provenance codes concern sample references; the rest are invented
    /// or malformed content.
    pub fn is_provenance(&self) -> bool {
        matches!(
            self,
            ViolationCode::InvalidSampleId | ViolationCode::EmptySampleIds | ViolationCode::MissingSampleIds
        )
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputViolation {
    pub code: ViolationCode,
    pub message: String,
}

impl OutputViolation {
    pub fn new(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for OutputViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputValidationResult {
    pub is_valid: bool,
    pub errors: Vec<OutputViolation>,
    /// Non-rejecting findings.
    pub warnings: Vec<String>,
}

impl OutputValidationResult {
    fn from_parts(errors: Vec<OutputViolation>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn codes(&self) -> Vec<ViolationCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    pub fn has_code(&self, code: ViolationCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// Running accept/reject counters. Safe to share between workers.
#[derive(Debug, Default)]
pub struct RejectionStats {
    validated: AtomicU64,
    rejected: AtomicU64,
}

impl RejectionStats {
    pub fn record(&self, rejected: bool) {
        self.validated.fetch_add(1, Ordering::Relaxed);
        if rejected {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn validated(&self) -> u64 {
        self.validated.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Fraction of validations that rejected; zero before any validation.
    pub fn rejection_rate(&self) -> f64 {
        let validated = self.validated();
        if validated == 0 {
            0.0
        } else {
            self.rejected() as f64 / validated as f64
        }
    }

    pub fn reset(&self) {
        self.validated.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }
}

/// Rejects synthesizer output that carries invented provenance.
#[derive(Debug, Default)]
pub struct OutputValidator {
    stats: RejectionStats,
}

impl OutputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &RejectionStats {
        &self.stats
    }

    /// Scans the whole raw response text.
    pub fn validate(&self, raw: &str) -> OutputValidationResult {
        let mut errors = scan_text(raw, "output");
        errors.extend(scan_field_names(raw));
        let warnings = scan_legacy_arrays(raw);

        let result = OutputValidationResult::from_parts(errors, warnings);
        self.finish("raw_output", &result);
        result
    }

    /// Checks one parsed trigger against a batch of `max_sample_index` samples.
    pub fn validate_trigger(&self, trigger: &Value, max_sample_index: usize) -> OutputValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        match trigger.as_object() {
            Some(object) => {
                check_fields(object, &mut errors, &mut warnings);
                check_nested(trigger, "trigger", &mut errors);
                check_sample_ids(object.get("sampleIds"), max_sample_index, &mut errors);
                check_confidence(object.get("confidence"), &mut errors);
            }
            None => errors.push(OutputViolation::new(
                ViolationCode::InvalidJson,
                "trigger is not a JSON object",
            )),
        }

        let result = OutputValidationResult::from_parts(errors, warnings);
        self.finish("trigger", &result);
        result
    }

    fn finish(&self, scope: &'static str, result: &OutputValidationResult) {
        self.stats.record(!result.is_valid);
        for warning in &result.warnings {
            tracing::warn!(scope, warning = %warning, "Legacy provenance field in synthesizer output");
        }
        if !result.is_valid {
            let codes: Vec<&str> = result.errors.iter().map(|e| e.code.as_str()).collect();
            tracing::warn!(
                scope,
                codes = ?codes,
                error_count = result.errors.len(),
                rejection_rate = self.stats.rejection_rate(),
                "Rejected synthesizer output"
            );
        }
    }
}

fn check_fields(object: &Map<String, Value>, errors: &mut Vec<OutputViolation>, warnings: &mut Vec<String>) {
    for key in object.keys() {
        if CANDIDATE_FIELDS.contains(&key.as_str()) || is_forbidden_field(key) {
            // Forbidden keys are reported by the nested walk.
            continue;
        }
        if LEGACY_FIELDS.contains(&key.to_lowercase().as_str()) {
            warnings.push(format!("legacy '{}' field present; only sampleIds are trusted", key));
        } else {
            errors.push(OutputViolation::new(
                ViolationCode::UnexpectedField,
                format!("unexpected field '{}'", key),
            ));
        }
    }
}

/// Walks every key and string value, at any depth.
fn check_nested(value: &Value, path: &str, errors: &mut Vec<OutputViolation>) {
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                let child_path = format!("{}.{}", path, key);
                if is_forbidden_field(key) {
                    errors.push(OutputViolation::new(
                        ViolationCode::ForbiddenField,
                        format!("forbidden field '{}'", child_path),
                    ));
                }
                check_nested(child, &child_path, errors);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                check_nested(item, &format!("{}[{}]", path, i), errors);
            }
        }
        Value::String(text) => errors.extend(scan_text(text, path)),
        _ => {}
    }
}

fn check_sample_ids(value: Option<&Value>, max: usize, errors: &mut Vec<OutputViolation>) {
    let Some(value) = value else {
        errors.push(OutputViolation::new(ViolationCode::MissingSampleIds, "sampleIds is missing"));
        return;
    };
    let Some(ids) = value.as_array() else {
        errors.push(OutputViolation::new(
            ViolationCode::MissingSampleIds,
            "sampleIds is not an array",
        ));
        return;
    };
    if ids.is_empty() {
        errors.push(OutputViolation::new(ViolationCode::EmptySampleIds, "sampleIds is empty"));
        return;
    }
    // Every bad id is reported, so one bad reference never hides another.
    for id in ids {
        let in_range = id
            .as_u64()
            .map_or(false, |n| n >= 1 && n <= max as u64);
        if !in_range {
            errors.push(OutputViolation::new(
                ViolationCode::InvalidSampleId,
                format!("sampleId {} outside [1, {}]", id, max),
            ));
        }
    }
}

fn check_confidence(value: Option<&Value>, errors: &mut Vec<OutputViolation>) {
    let Some(value) = value else { return };
    let valid = value.as_f64().map_or(false, |c| (0.0..=1.0).contains(&c));
    if !valid {
        errors.push(OutputViolation::new(
            ViolationCode::InvalidConfidence,
            format!("confidence {} outside [0, 1]", value),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_trigger(ids: Value) -> Value {
        json!({
            "sampleIds": ids,
            "category": "renewal",
            "title": "Contract renewals approaching",
            "confidence": 0.8,
            "executiveSummary": "Several teams mention contracts ending this quarter."
        })
    }

    #[test]
    fn in_range_sample_ids_validate() {
        let v = OutputValidator::new();
        let result = v.validate_trigger(&valid_trigger(json!([1, 2, 3])), 3);
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn out_of_range_sample_id_is_rejected_without_accepting_the_rest() {
        let v = OutputValidator::new();
        let result = v.validate_trigger(&valid_trigger(json!([1, 4])), 3);
        assert!(!result.is_valid);
        assert_eq!(result.codes(), vec![ViolationCode::InvalidSampleId]);
    }

    #[test]
    fn every_bad_sample_id_is_reported() {
        let v = OutputValidator::new();
        let result = v.validate_trigger(&valid_trigger(json!([0, 2, 9, "1", -1])), 3);
        assert_eq!(result.errors.len(), 4);
    }

    #[test]
    fn empty_and_missing_sample_ids_are_rejected() {
        let v = OutputValidator::new();
        assert!(v
            .validate_trigger(&valid_trigger(json!([])), 3)
            .has_code(ViolationCode::EmptySampleIds));

        let mut missing = valid_trigger(json!([1]));
        missing.as_object_mut().unwrap().remove("sampleIds");
        assert!(v.validate_trigger(&missing, 3).has_code(ViolationCode::MissingSampleIds));
    }

    #[test]
    fn forbidden_field_rejects_even_with_valid_sample_ids() {
        let v = OutputValidator::new();
        for field in ["url", "author", "quote"] {
            let mut trigger = valid_trigger(json!([1]));
            trigger[field] = json!("made up");
            let result = v.validate_trigger(&trigger, 3);
            assert!(result.has_code(ViolationCode::ForbiddenField), "field {}", field);
        }
    }

    #[test]
    fn nested_forbidden_field_in_legacy_evidence_is_rejected() {
        let v = OutputValidator::new();
        let mut trigger = valid_trigger(json!([1]));
        trigger["evidence"] = json!([{"quote": "I love it", "platform": "reddit"}]);
        let result = v.validate_trigger(&trigger, 3);
        assert!(result.has_code(ViolationCode::ForbiddenField));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn legacy_array_alone_is_only_a_warning() {
        let v = OutputValidator::new();
        let mut trigger = valid_trigger(json!([1]));
        trigger["sources"] = json!([1, 2]);
        let result = v.validate_trigger(&trigger, 3);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn link_inside_summary_is_rejected() {
        let v = OutputValidator::new();
        let mut trigger = valid_trigger(json!([1]));
        trigger["executiveSummary"] = json!("Buyer posted at www.example.com");
        assert!(v.validate_trigger(&trigger, 3).has_code(ViolationCode::WwwDetected));
    }

    #[test]
    fn unexpected_field_and_bad_confidence_are_rejected() {
        let v = OutputValidator::new();
        let mut trigger = valid_trigger(json!([1]));
        trigger["company"] = json!("Acme");
        trigger["confidence"] = json!(1.4);
        let result = v.validate_trigger(&trigger, 3);
        assert!(result.has_code(ViolationCode::UnexpectedField));
        assert!(result.has_code(ViolationCode::InvalidConfidence));
    }

    #[test]
    fn raw_output_with_link_is_rejected_regardless_of_json() {
        let v = OutputValidator::new();
        let raw = r#"{"triggers":[{"sampleIds":[1],"title":"See https://evil.example/x","confidence":0.5}]}"#;
        let result = v.validate(raw);
        assert!(!result.is_valid);
        assert!(result.has_code(ViolationCode::UrlDetected));
    }

    #[test]
    fn raw_output_with_forbidden_field_is_rejected() {
        let v = OutputValidator::new();
        let raw = r#"{"triggers":[{"sampleIds":[1],"author":"Jane","confidence":0.5}]}"#;
        assert!(v.validate(raw).has_code(ViolationCode::ForbiddenField));
    }

    #[test]
    fn non_object_trigger_is_invalid_json() {
        let v = OutputValidator::new();
        assert!(v.validate_trigger(&json!("text"), 3).has_code(ViolationCode::InvalidJson));
    }

    #[test]
    fn rejection_rate_tracks_outcomes() {
        let v = OutputValidator::new();
        assert_eq!(v.stats().rejection_rate(), 0.0);
        v.validate(r#"{"triggers":[]}"#);
        v.validate("visit www.x.com");
        assert_eq!(v.stats().validated(), 2);
        assert_eq!(v.stats().rejected(), 1);
        assert!((v.stats().rejection_rate() - 0.5).abs() < 1e-9);
        v.stats().reset();
        assert_eq!(v.stats().validated(), 0);
    }
}
