//! Typed rejection records. Nothing is dropped without one.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode};

use super::fit::FitResult;
use super::output::OutputValidationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Invented links, handles or provenance fields.
    Hallucination,
    /// Sample references out of range or unresolvable sources.
    Provenance,
    /// Below the buyer/product-fit threshold.
    Fit,
    /// Unparseable or structurally wrong output.
    Malformed,
}

impl RejectionKind {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            RejectionKind::Hallucination => ErrorCode::HallucinationDetected,
            RejectionKind::Provenance => ErrorCode::ProvenanceViolation,
            RejectionKind::Fit => ErrorCode::FitRejected,
            RejectionKind::Malformed => ErrorCode::InvalidFormat,
        }
    }

    /// Fit rejections are expected noise; everything else means the
    /// synthesizer misbehaved.
    pub fn is_critical(&self) -> bool {
        !matches!(self, RejectionKind::Fit)
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectionKind::Hallucination => "hallucination",
            RejectionKind::Provenance => "provenance",
            RejectionKind::Fit => "fit",
            RejectionKind::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    /// Position in the synthesizer's trigger list; `None` for whole-output rejections.
    pub trigger_index: Option<usize>,
    pub title: Option<String>,
    pub reasons: Vec<String>,
}

impl Rejection {
    pub fn new(kind: RejectionKind, reasons: Vec<String>) -> Self {
        Self {
            kind,
            trigger_index: None,
            title: None,
            reasons,
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.trigger_index = Some(index);
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builds a rejection from a failed output validation.
    ///
    /// Any content violation makes the whole thing a hallucination; only
    /// pure sample-reference problems count as provenance.
    pub fn from_output(result: &OutputValidationResult) -> Self {
        let kind = if result.errors.iter().all(|e| e.code.is_provenance()) {
            RejectionKind::Provenance
        } else {
            RejectionKind::Hallucination
        };
        Self::new(kind, result.errors.iter().map(ToString::to_string).collect())
    }

    pub fn from_fit(result: &FitResult) -> Self {
        let mut reasons: Vec<String> = result.rejection_reason.iter().cloned().collect();
        reasons.push(result.reasoning.clone());
        Self::new(RejectionKind::Fit, reasons)
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(RejectionKind::Malformed, vec![reason.into()])
    }
}

impl From<&Rejection> for DomainError {
    fn from(rejection: &Rejection) -> Self {
        let mut err = DomainError::new(rejection.kind.error_code(), rejection.reasons.join("; "));
        if let Some(index) = rejection.trigger_index {
            err = err.with_detail("trigger_index", index.to_string());
        }
        if let Some(title) = &rejection.title {
            err = err.with_detail("title", title.clone());
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{OutputValidator, ViolationCode};
    use serde_json::json;

    #[test]
    fn provenance_only_errors_are_provenance() {
        let v = OutputValidator::new();
        let result = v.validate_trigger(
            &json!({"sampleIds": [7], "category": "renewal", "title": "t", "confidence": 0.5}),
            3,
        );
        assert_eq!(result.codes(), vec![ViolationCode::InvalidSampleId]);
        assert_eq!(Rejection::from_output(&result).kind, RejectionKind::Provenance);
    }

    #[test]
    fn mixed_errors_are_hallucination() {
        let v = OutputValidator::new();
        let result = v.validate_trigger(
            &json!({"sampleIds": [7], "url": "x", "title": "t", "confidence": 0.5}),
            3,
        );
        let rejection = Rejection::from_output(&result).at(2).titled("t");
        assert_eq!(rejection.kind, RejectionKind::Hallucination);
        assert_eq!(rejection.trigger_index, Some(2));
        assert_eq!(rejection.reasons.len(), result.errors.len());
        assert!(rejection.kind.is_critical());
    }

    #[test]
    fn rejection_reports_as_coded_domain_error() {
        let rejection = Rejection::new(RejectionKind::Provenance, vec!["sampleId 9 is not in the batch".into()])
            .at(1)
            .titled("Renewals coming up");
        let err = DomainError::from(&rejection);
        assert_eq!(err.code, ErrorCode::ProvenanceViolation);
        assert_eq!(err.to_string(), "[PROVENANCE_VIOLATION] sampleId 9 is not in the batch");
        assert_eq!(err.details.get("trigger_index").map(String::as_str), Some("1"));
        assert_eq!(err.details.get("title").map(String::as_str), Some("Renewals coming up"));
    }
}
