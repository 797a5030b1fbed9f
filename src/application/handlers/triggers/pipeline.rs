//! TriggerPipeline - route, synthesize, validate and consolidate one batch.
//!
//! The uncached core of trigger generation. Everything the synthesizer
//! returns is untrusted: the raw text is scanned first, then each trigger
//! object, then each candidate's fit. Evidence is rebuilt from the
//! verified source registry, never from synthesizer text.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::foundation::{ErrorCode, Timestamp, UnitScore, VerifiedSourceId};
use crate::domain::profile::ProfileRoutingConfig;
use crate::domain::routing::{ProfileRouter, SignalFilter};
use crate::domain::scoring::UrgencyLevel;
use crate::domain::signal::{ProfileType, RawSignal, SignalCategory};
use crate::domain::synthesis::SynthesisBatch;
use crate::domain::trigger::{parse_candidates, ConsolidatedTrigger, EvidenceItem, NewTrigger, TriggerCandidate};
use crate::domain::validation::{
    BuyerProductFitValidator, FitResult, JourneyStageClassifier, OutputValidator, Rejection, RejectionKind,
    ValueProposition,
};
use crate::ports::{Clock, RegistryError, SynthesisError, TriggerSynthesizer, VerifiedSourceRegistry};

/// Default cap on samples offered to the synthesizer in one batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;

/// An `active` trigger is time-sensitive when its implied timeline is at
/// most this many days.
pub const TIME_SENSITIVE_DAYS: u32 = 30;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl PipelineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::Synthesis(_) => ErrorCode::SynthesisFailed,
            PipelineError::Registry(_) => ErrorCode::RegistryUnavailable,
        }
    }
}

/// What one pipeline run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    pub profile_type: ProfileType,
    pub filter: SignalFilter,
    pub signals: Vec<RawSignal>,
    pub uvp: ValueProposition,
}

/// Accepted triggers plus a typed record of everything rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub triggers: Vec<ConsolidatedTrigger>,
    pub rejections: Vec<Rejection>,
    /// Samples offered to the synthesizer.
    pub sample_count: usize,
    pub generated_at: Timestamp,
}

impl PipelineResult {
    fn empty(generated_at: Timestamp) -> Self {
        Self {
            triggers: Vec::new(),
            rejections: Vec::new(),
            sample_count: 0,
            generated_at,
        }
    }

    pub fn rejections_of(&self, kind: RejectionKind) -> impl Iterator<Item = &Rejection> {
        self.rejections.iter().filter(move |r| r.kind == kind)
    }
}

pub struct TriggerPipeline {
    router: Arc<ProfileRouter>,
    registry: Arc<dyn VerifiedSourceRegistry>,
    synthesizer: Arc<dyn TriggerSynthesizer>,
    journey: JourneyStageClassifier,
    output_validator: Arc<OutputValidator>,
    fit_validator: BuyerProductFitValidator,
    clock: Arc<dyn Clock>,
    max_batch_size: usize,
}

impl TriggerPipeline {
    pub fn new(
        router: Arc<ProfileRouter>,
        registry: Arc<dyn VerifiedSourceRegistry>,
        synthesizer: Arc<dyn TriggerSynthesizer>,
        journey: JourneyStageClassifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            router,
            registry,
            synthesizer,
            journey,
            output_validator: Arc::new(OutputValidator::new()),
            fit_validator: BuyerProductFitValidator::default(),
            clock,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn with_fit_validator(mut self, validator: BuyerProductFitValidator) -> Self {
        self.fit_validator = validator;
        self
    }

    /// Shares an output validator, and its rejection counters, with other users.
    pub fn with_output_validator(mut self, validator: Arc<OutputValidator>) -> Self {
        self.output_validator = validator;
        self
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max.max(1);
        self
    }

    pub fn output_validator(&self) -> &OutputValidator {
        &self.output_validator
    }

    pub fn router(&self) -> &ProfileRouter {
        &self.router
    }

    pub async fn run(&self, input: &PipelineInput) -> Result<PipelineResult, PipelineError> {
        let now = self.clock.now();
        let profile = self.router.profile(input.profile_type);

        let routed = self.router.route_at(input.profile_type, &input.signals, now);
        let filtered = self.router.filter(input.profile_type, routed, &input.filter);
        let selected = self.router.top_n(filtered, self.max_batch_size);
        if selected.is_empty() {
            debug!(profile = %input.profile_type, "No signals survived routing, skipping synthesis");
            return Ok(PipelineResult::empty(now));
        }

        let mut registered = Vec::with_capacity(selected.len());
        for signal in selected {
            let id = self.registry.register(&signal.signal).await?;
            registered.push((id, signal));
        }
        let batch = SynthesisBatch::new(input.profile_type, registered);

        let raw = self.synthesizer.synthesize(&batch.request()).await?;
        let mut result = PipelineResult {
            sample_count: batch.len(),
            ..PipelineResult::empty(now)
        };

        let whole = self.output_validator.validate(&raw);
        if !whole.is_valid {
            result.rejections = reject_all(&raw, Rejection::from_output(&whole));
            return Ok(result);
        }

        let values = match parse_candidates(&raw) {
            Ok(values) => values,
            Err(e) => {
                result.rejections.push(Rejection::malformed(e.to_string()));
                return Ok(result);
            }
        };

        for (index, value) in values.iter().enumerate() {
            match self.accept(index, value, &batch, input, profile, now).await {
                Ok(trigger) => result.triggers.push(trigger),
                Err(rejection) => result.rejections.push(rejection),
            }
        }

        info!(
            profile = %input.profile_type,
            synthesizer = self.synthesizer.name(),
            samples = batch.len(),
            candidates = values.len(),
            accepted = result.triggers.len(),
            rejected = result.rejections.len(),
            "Trigger generation complete"
        );
        Ok(result)
    }

    async fn accept(
        &self,
        index: usize,
        value: &Value,
        batch: &SynthesisBatch,
        input: &PipelineInput,
        profile: &ProfileRoutingConfig,
        now: Timestamp,
    ) -> Result<ConsolidatedTrigger, Rejection> {
        let label = |rejection: Rejection| match title_of(value) {
            Some(title) => rejection.at(index).titled(title),
            None => rejection.at(index),
        };

        let check = self.output_validator.validate_trigger(value, batch.len());
        if !check.is_valid {
            return Err(label(Rejection::from_output(&check)));
        }

        let candidate = TriggerCandidate::from_value(value).map_err(|e| label(Rejection::malformed(e.to_string())))?;

        let fit = self.fit_validator.validate_fit(&candidate, &input.uvp, profile);
        if !fit.is_valid {
            info!(
                title = %candidate.title,
                fit_score = fit.fit_score.value(),
                reasoning = %fit.reasoning,
                "Trigger rejected for buyer/product fit"
            );
            return Err(label(Rejection::from_fit(&fit)));
        }

        self.consolidate(&candidate, batch, profile, &fit, now).await.map_err(label)
    }

    async fn consolidate(
        &self,
        candidate: &TriggerCandidate,
        batch: &SynthesisBatch,
        profile: &ProfileRoutingConfig,
        fit: &FitResult,
        now: Timestamp,
    ) -> Result<ConsolidatedTrigger, Rejection> {
        let mut evidence = Vec::new();
        let mut contents = Vec::new();
        let mut seen = HashSet::new();

        for sample_id in &candidate.sample_ids {
            if !seen.insert(*sample_id) {
                continue;
            }
            let sample = batch
                .sample(*sample_id)
                .ok_or_else(|| provenance(format!("sampleId {} is not in the batch", sample_id)))?;
            let source = match self.registry.resolve(&sample.source_id).await {
                Ok(Some(source)) => source,
                Ok(None) => {
                    return Err(provenance(format!(
                        "verified source {} for sampleId {} does not resolve",
                        sample.source_id, sample_id
                    )))
                }
                Err(e) => return Err(provenance(format!("cannot verify sampleId {}: {}", sample_id, e))),
            };
            contents.push(source.original_content().to_string());
            evidence.push(EvidenceItem::from_source(&source, sample.signal.composite_score));
        }

        let category = SignalCategory::parse(&candidate.category)
            .or_else(|| batch.dominant_category(&candidate.sample_ids))
            .unwrap_or(profile.fallback_category);
        let urgency = self.router.urgency_classifier().classify(&contents.join(" "), None);
        let is_time_sensitive = match urgency.level {
            UrgencyLevel::Immediate => true,
            UrgencyLevel::Active => urgency.timeline_days.map_or(false, |d| d <= TIME_SENSITIVE_DAYS),
            _ => false,
        };

        let trigger = ConsolidatedTrigger::accept(
            NewTrigger {
                title: candidate.title.trim().to_string(),
                category,
                confidence: UnitScore::new(candidate.confidence),
                evidence,
                buyer_journey_stage: self.journey.classify(&candidate.text()).stage,
                executive_summary: candidate.executive_summary.trim().to_string(),
                is_time_sensitive,
                fit_score: fit.fit_score,
            },
            now,
        );

        let mut resolvable: HashSet<VerifiedSourceId> = HashSet::new();
        for id in trigger.source_ids() {
            if matches!(self.registry.contains(id).await, Ok(true)) {
                resolvable.insert(*id);
            }
        }
        if !trigger.is_displayable(|id| resolvable.contains(id)) {
            return Err(provenance("trigger has no resolvable evidence".to_string()));
        }
        Ok(trigger)
    }
}

fn provenance(reason: String) -> Rejection {
    Rejection::new(RejectionKind::Provenance, vec![reason])
}

fn title_of(value: &Value) -> Option<&str> {
    value.get("title").and_then(Value::as_str).filter(|t| !t.trim().is_empty())
}

/// One rejection per trigger in a response that failed as a whole, or a
/// single whole-output rejection when the triggers cannot be told apart.
fn reject_all(raw: &str, rejection: Rejection) -> Vec<Rejection> {
    match parse_candidates(raw) {
        Ok(values) if !values.is_empty() => values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let r = rejection.clone().at(i);
                match title_of(value) {
                    Some(title) => r.titled(title),
                    None => r,
                }
            })
            .collect(),
        _ => vec![rejection],
    }
}
