//! One numbered batch of signals offered to the synthesizer.

use serde::Serialize;

use crate::domain::foundation::VerifiedSourceId;
use crate::domain::routing::ProcessedSignal;
use crate::domain::signal::{ProfileType, SignalCategory};
use crate::domain::validation::mask_for_prompt;

/// A routed signal with its registry id and 1-based sample position.
#[derive(Debug, Clone)]
pub struct BatchSample {
    pub sample_id: usize,
    pub source_id: VerifiedSourceId,
    pub signal: ProcessedSignal,
}

/// What the synthesizer is allowed to see of one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSample {
    pub sample_id: usize,
    pub content: String,
}

/// Outbound request to the synthesizer: content only, positions only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub profile_type: ProfileType,
    pub samples: Vec<PromptSample>,
}

impl SynthesisRequest {
    pub fn max_sample_index(&self) -> usize {
        self.samples.len()
    }

    /// Numbered lines, `[i] content`.
    pub fn prompt_body(&self) -> String {
        self.samples
            .iter()
            .map(|s| format!("[{}] {}", s.sample_id, s.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Maps sample positions back to verified sources for one batch.
#[derive(Debug, Clone)]
pub struct SynthesisBatch {
    profile_type: ProfileType,
    samples: Vec<BatchSample>,
}

impl SynthesisBatch {
    /// Numbers `registered` signals `1..=N`, in the given order.
    pub fn new(profile_type: ProfileType, registered: Vec<(VerifiedSourceId, ProcessedSignal)>) -> Self {
        let samples = registered
            .into_iter()
            .enumerate()
            .map(|(i, (source_id, signal))| BatchSample {
                sample_id: i + 1,
                source_id,
                signal,
            })
            .collect();
        Self { profile_type, samples }
    }

    pub fn profile_type(&self) -> ProfileType {
        self.profile_type
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[BatchSample] {
        &self.samples
    }

    /// The sample at 1-based position `sample_id`.
    pub fn sample(&self, sample_id: usize) -> Option<&BatchSample> {
        sample_id.checked_sub(1).and_then(|i| self.samples.get(i))
    }

    pub fn resolve_sample(&self, sample_id: usize) -> Option<VerifiedSourceId> {
        self.sample(sample_id).map(|s| s.source_id)
    }

    /// Most common category among the given samples; ties go to the
    /// higher-scoring sample's category.
    pub fn dominant_category(&self, sample_ids: &[usize]) -> Option<SignalCategory> {
        let mut tally: Vec<(SignalCategory, usize, f64)> = Vec::new();
        for sample in sample_ids.iter().filter_map(|id| self.sample(*id)) {
            let score = sample.signal.composite_score.value();
            match tally.iter_mut().find(|(c, _, _)| *c == sample.signal.category) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 = entry.2.max(score);
                }
                None => tally.push((sample.signal.category, 1, score)),
            }
        }
        tally
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)))
            .map(|(c, _, _)| c)
    }

    /// The outbound request. Author, URL and location never leave here;
    /// links and handles in the content itself are masked.
    pub fn request(&self) -> SynthesisRequest {
        SynthesisRequest {
            profile_type: self.profile_type,
            samples: self
                .samples
                .iter()
                .map(|s| PromptSample {
                    sample_id: s.sample_id,
                    content: mask_for_prompt(s.signal.signal.content().trim()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SignalId, Timestamp};
    use crate::domain::profile::{CompiledPatterns, ProfileCatalog};
    use crate::domain::routing::ProfileRouter;
    use crate::domain::signal::RawSignal;
    use std::sync::Arc;

    fn batch() -> SynthesisBatch {
        let router = ProfileRouter::new(Arc::new(ProfileCatalog::builtin()), CompiledPatterns::builtin().unwrap());
        let signals = vec![
            RawSignal::new(
                SignalId::new("a").unwrap(),
                "reddit",
                "Switching from our agency, ping @growth_guy or see https://x.example/post",
                Some(Timestamp::now()),
            )
            .with_author("secret_author")
            .with_url("https://reddit.com/r/marketing/123"),
            RawSignal::new(SignalId::new("b").unwrap(), "linkedin", "Budget is approved", Some(Timestamp::now())),
        ];
        let processed = router.route(ProfileType::RegionalAgency, &signals);
        SynthesisBatch::new(
            ProfileType::RegionalAgency,
            processed.into_iter().map(|p| (VerifiedSourceId::new(), p)).collect(),
        )
    }

    #[test]
    fn samples_are_numbered_from_one() {
        let batch = batch();
        assert_eq!(batch.len(), 2);
        assert!(batch.resolve_sample(0).is_none());
        assert!(batch.resolve_sample(1).is_some());
        assert!(batch.resolve_sample(2).is_some());
        assert!(batch.resolve_sample(3).is_none());
    }

    #[test]
    fn prompt_contains_content_only() {
        let request = batch().request();
        let body = request.prompt_body();
        assert_eq!(request.max_sample_index(), 2);
        assert!(body.starts_with("[1] Switching from our agency"));
        assert!(body.contains("[2] Budget is approved"));
        assert!(!body.contains("secret_author"));
        assert!(!body.contains("reddit.com"));
        assert!(!body.contains("@growth_guy"));
        assert!(!body.contains("https://"));
        assert!(body.contains("[user]"));
        assert!(body.contains("[link]"));
    }

    #[test]
    fn dominant_category_counts_referenced_samples() {
        let batch = batch();
        assert_eq!(batch.dominant_category(&[1]), Some(SignalCategory::SwitchingIntent));
        assert_eq!(batch.dominant_category(&[2]), Some(SignalCategory::Budget));
        assert_eq!(batch.dominant_category(&[9]), None);
    }
}
