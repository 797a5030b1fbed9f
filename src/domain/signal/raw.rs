//! Raw signal record produced by the acquisition layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{deserialize_lenient_timestamp, SignalId, Timestamp};

/// One piece of untrusted third-party text about a potential buyer.
///
/// Immutable once created. `author` and `url` are registry-only: they feed
/// the verified source registry and source scoring, and are never rendered
/// into anything sent to the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    id: SignalId,
    source: String,
    content: String,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    timestamp: Option<Timestamp>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

impl RawSignal {
    /// Creates a signal with the mandatory fields.
    pub fn new(
        id: SignalId,
        source: impl Into<String>,
        content: impl Into<String>,
        timestamp: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            source: source.into(),
            content: content.into(),
            timestamp,
            platform: None,
            author: None,
            url: None,
            location: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> &SignalId {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// Platform if known, otherwise the source identifier.
    pub fn platform_or_source(&self) -> &str {
        self.platform.as_deref().unwrap_or(&self.source)
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        &self.metadata
    }

    /// String metadata value, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}
