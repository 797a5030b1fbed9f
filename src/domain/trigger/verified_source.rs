//! Canonical origin record for one raw signal.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SignalId, Timestamp, VerifiedSourceId};
use crate::domain::signal::RawSignal;

/// The true origin fields of a signal, addressable only by an opaque id.
///
/// Immutable after registration. The synthesizer never sees these records;
/// everything displayed as provenance comes from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSource {
    id: VerifiedSourceId,
    signal_id: SignalId,
    original_url: Option<String>,
    original_author: Option<String>,
    original_content: String,
    platform: String,
    registered_at: Timestamp,
}

impl VerifiedSource {
    /// Captures `signal`'s origin fields under `id`.
    pub fn from_signal(id: VerifiedSourceId, signal: &RawSignal, registered_at: Timestamp) -> Self {
        Self {
            id,
            signal_id: signal.id().clone(),
            original_url: signal.url().map(str::to_string),
            original_author: signal.author().map(str::to_string),
            original_content: signal.content().to_string(),
            platform: signal.platform_or_source().to_string(),
            registered_at,
        }
    }

    pub fn id(&self) -> &VerifiedSourceId {
        &self.id
    }

    pub fn signal_id(&self) -> &SignalId {
        &self.signal_id
    }

    pub fn original_url(&self) -> Option<&str> {
        self.original_url.as_deref()
    }

    pub fn original_author(&self) -> Option<&str> {
        self.original_author.as_deref()
    }

    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn registered_at(&self) -> Timestamp {
        self.registered_at
    }

    /// The original content cut to at most `max_chars` characters, on a
    /// word boundary where possible, with an ellipsis when shortened.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let content = self.original_content.trim();
        if content.chars().count() <= max_chars {
            return content.to_string();
        }
        let cut: String = content.chars().take(max_chars).collect();
        let trimmed = match cut.rfind(char::is_whitespace) {
            Some(pos) if pos > max_chars / 2 => &cut[..pos],
            _ => cut.as_str(),
        };
        format!("{}…", trimmed.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(content: &str) -> VerifiedSource {
        let signal = RawSignal::new(SignalId::new("s1").unwrap(), "reddit", content, None)
            .with_author("jdoe")
            .with_url("https://reddit.com/r/x/1");
        VerifiedSource::from_signal(VerifiedSourceId::new(), &signal, Timestamp::now())
    }

    #[test]
    fn captures_origin_fields() {
        let s = source("hello");
        assert_eq!(s.original_author(), Some("jdoe"));
        assert_eq!(s.original_url(), Some("https://reddit.com/r/x/1"));
        assert_eq!(s.platform(), "reddit");
        assert_eq!(s.signal_id().as_str(), "s1");
    }

    #[test]
    fn excerpt_keeps_short_content_and_cuts_long_content_on_words() {
        assert_eq!(source("short text").excerpt(50), "short text");

        let long = source("the quick brown fox jumps over the lazy dog");
        let excerpt = long.excerpt(20);
        assert_eq!(excerpt, "the quick brown fox…");
    }
}
