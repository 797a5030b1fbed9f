//! GenerateTriggersHandler - cached trigger generation for one profile.
//!
//! Builds the cache key from profile, segment and filter, then serves the
//! cached pipeline result or runs the pipeline through the cache. The
//! fetcher it hands the cache is kept for background refreshes, so a stale
//! entry is regenerated from the same inputs.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::adapters::cache::{CacheError, CacheKey, CacheKeyError, CacheStatus, InMemoryTriggerCache};
use crate::domain::foundation::ErrorCode;
use crate::domain::routing::SignalFilter;
use crate::domain::signal::{ProfileType, RawSignal};
use crate::domain::trigger::ConsolidatedTrigger;
use crate::domain::validation::{Rejection, ValueProposition};
use crate::ports::{refresh_fetcher, FetchError};

use super::pipeline::{PipelineInput, PipelineResult, TriggerPipeline};

/// Command to generate buying triggers.
#[derive(Debug, Clone)]
pub struct GenerateTriggersCommand {
    /// Tenant-level profile identifier, used only for cache keying.
    pub profile_id: String,
    pub profile_type: ProfileType,
    pub segment: Option<String>,
    pub filter: SignalFilter,
    pub signals: Vec<RawSignal>,
    pub uvp: ValueProposition,
}

impl GenerateTriggersCommand {
    pub fn cache_key(&self) -> Result<CacheKey, CacheKeyError> {
        CacheKey::builder(&self.profile_id)
            .segment(self.segment.as_deref())
            .filter(&self.filter)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub triggers: Vec<ConsolidatedTrigger>,
    pub rejections: Vec<Rejection>,
    /// Cache state before this call.
    pub cache_status: CacheStatus,
    pub from_cache: bool,
    /// Set when a failed regeneration fell back to cached triggers.
    pub fetch_error: Option<String>,
    pub cache_key: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerateTriggersError {
    #[error("profile id cannot be empty")]
    EmptyProfileId,

    #[error("invalid cache key: {0}")]
    InvalidKey(#[from] CacheKeyError),

    #[error("trigger generation failed: {0}")]
    Fetch(FetchError),

    #[error(transparent)]
    Cache(CacheError),
}

impl GenerateTriggersError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GenerateTriggersError::EmptyProfileId => ErrorCode::EmptyField,
            GenerateTriggersError::InvalidKey(_) => ErrorCode::InvalidFormat,
            GenerateTriggersError::Fetch(_) => ErrorCode::FetchFailed,
            GenerateTriggersError::Cache(_) => ErrorCode::CacheUnavailable,
        }
    }
}

impl From<CacheError> for GenerateTriggersError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Fetch(e) => GenerateTriggersError::Fetch(e),
            other => GenerateTriggersError::Cache(other),
        }
    }
}

/// Handler for cached trigger generation.
///
/// # Usage
///
/// ```rust,ignore
/// let handler = GenerateTriggersHandler::new(pipeline, cache);
/// let outcome = handler.handle(cmd).await?;
/// ```
pub struct GenerateTriggersHandler {
    pipeline: Arc<TriggerPipeline>,
    cache: InMemoryTriggerCache<PipelineResult>,
    fetch_timeout: Option<Duration>,
}

impl GenerateTriggersHandler {
    pub fn new(pipeline: Arc<TriggerPipeline>, cache: InMemoryTriggerCache<PipelineResult>) -> Self {
        Self {
            pipeline,
            cache,
            fetch_timeout: None,
        }
    }

    /// Bounds how long a caller waits on a cache miss.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn cache(&self) -> &InMemoryTriggerCache<PipelineResult> {
        &self.cache
    }

    pub async fn handle(&self, cmd: GenerateTriggersCommand) -> Result<PipelineOutcome, GenerateTriggersError> {
        if cmd.profile_id.trim().is_empty() {
            return Err(GenerateTriggersError::EmptyProfileId);
        }
        let key = cmd.cache_key()?;

        let pipeline = Arc::clone(&self.pipeline);
        let input = Arc::new(PipelineInput {
            profile_type: cmd.profile_type,
            filter: cmd.filter,
            signals: cmd.signals,
            uvp: cmd.uvp,
        });
        let fetcher = refresh_fetcher(move || {
            let pipeline = Arc::clone(&pipeline);
            let input = Arc::clone(&input);
            async move {
                pipeline
                    .run(&input)
                    .await
                    .map_err(|e| FetchError::failed(e.to_string()))
            }
        });

        let outcome = match self.fetch_timeout {
            Some(limit) => self.cache.get_or_fetch_with_timeout(key.as_str(), fetcher, limit).await?,
            None => self.cache.get_or_fetch(key.as_str(), fetcher).await?,
        };
        debug!(key = %key, status = %outcome.status, from_cache = outcome.from_cache, "Trigger cache lookup");

        Ok(PipelineOutcome {
            triggers: outcome.data.triggers,
            rejections: outcome.data.rejections,
            cache_status: outcome.status,
            from_cache: outcome.from_cache,
            fetch_error: outcome.fetch_error.map(|e| e.to_string()),
            cache_key: key.to_string(),
        })
    }

    /// Drops every cached result for `profile_id`.
    pub async fn invalidate_profile(&self, profile_id: &str) -> Result<usize, GenerateTriggersError> {
        if profile_id.trim().is_empty() {
            return Err(GenerateTriggersError::EmptyProfileId);
        }
        let bare = CacheKey::builder(profile_id).build()?;
        let suffixed = self.cache.invalidate_prefix(&CacheKey::profile_prefix(profile_id)?).await;
        Ok(suffixed + usize::from(self.cache.invalidate(bare.as_str()).await))
    }
}
