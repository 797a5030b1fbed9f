//! Mock synthesizer for tests and offline runs.
//!
//! Replays queued responses in order, can inject errors or latency, and
//! records every request it receives so tests can inspect exactly what
//! would have left the process.
//!
//! # Example
//!
//! ```ignore
//! let synthesizer = MockSynthesizer::new()
//!     .with_response(r#"{"triggers": []}"#)
//!     .with_delay(Duration::from_millis(50));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::synthesis::SynthesisRequest;
use crate::ports::{SynthesisError, TriggerSynthesizer};

/// Returned when the queue is empty.
pub const EMPTY_RESPONSE: &str = r#"{"triggers": []}"#;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(SynthesisError),
}

#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    /// Consumed in order.
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<SynthesisRequest>>>,
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, raw: impl Into<String>) -> Self {
        self.push(MockResponse::Success(raw.into()));
        self
    }

    /// Queues the JSON serialization of `value`.
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_response(value.to_string())
    }

    pub fn with_error(self, error: SynthesisError) -> Self {
        self.push(MockResponse::Error(error));
        self
    }

    /// Simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a response on a shared mock after construction.
    pub fn push(&self, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn get_calls(&self) -> Vec<SynthesisRequest> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success(EMPTY_RESPONSE.to_string()))
    }
}

#[async_trait]
impl TriggerSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success(raw) => Ok(raw),
            MockResponse::Error(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::ProfileType;
    use crate::domain::synthesis::PromptSample;

    fn request() -> SynthesisRequest {
        SynthesisRequest {
            profile_type: ProfileType::RegionalAgency,
            samples: vec![PromptSample {
                sample_id: 1,
                content: "We need a new agency".into(),
            }],
        }
    }

    #[tokio::test]
    async fn replays_queue_then_default() {
        let mock = MockSynthesizer::new()
            .with_response("first")
            .with_error(SynthesisError::Timeout(30));

        assert_eq!(mock.synthesize(&request()).await.unwrap(), "first");
        assert_eq!(mock.synthesize(&request()).await.unwrap_err(), SynthesisError::Timeout(30));
        assert_eq!(mock.synthesize(&request()).await.unwrap(), EMPTY_RESPONSE);
    }

    #[tokio::test]
    async fn records_requests() {
        let mock = MockSynthesizer::new();
        mock.synthesize(&request()).await.unwrap();
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.get_calls()[0].samples[0].content, "We need a new agency");
        mock.clear_calls();
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn clones_share_the_queue() {
        let mock = MockSynthesizer::new();
        let shared = mock.clone();
        shared.push(MockResponse::Success("queued later".into()));
        assert_eq!(mock.synthesize(&request()).await.unwrap(), "queued later");
        assert_eq!(shared.call_count(), 1);
    }
}
