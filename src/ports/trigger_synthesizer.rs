//! Trigger Synthesizer Port - Interface to the external LLM collaborator.
//!
//! The synthesizer receives only a numbered, content-only list of samples
//! and returns raw text. Prompt construction, model choice and provider
//! retries live behind this port; the pipeline never retries a call.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::synthesis::SynthesisRequest;

#[async_trait]
pub trait TriggerSynthesizer: Send + Sync {
    /// Returns the synthesizer's raw response text.
    ///
    /// The text is untrusted and must pass output validation before any
    /// part of it is used.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, SynthesisError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SynthesisError {
    #[error("synthesizer unavailable: {0}")]
    Unavailable(String),

    #[error("synthesizer timed out after {0}s")]
    Timeout(u64),

    #[error("synthesizer refused the request: {0}")]
    Refused(String),
}

impl SynthesisError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
