//! In-memory verified source registry.
//!
//! Single-process. Records live as long as the registry does.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::foundation::{SignalId, VerifiedSourceId};
use crate::domain::signal::RawSignal;
use crate::domain::trigger::VerifiedSource;
use crate::ports::{Clock, RegistryError, VerifiedSourceRegistry};

use crate::adapters::clock::SystemClock;

type ContentDigest = [u8; 32];

#[derive(Debug, Default)]
struct RegistryState {
    sources: HashMap<VerifiedSourceId, VerifiedSource>,
    by_content: HashMap<(SignalId, ContentDigest), VerifiedSourceId>,
    /// Most recent record per signal.
    by_signal: HashMap<SignalId, VerifiedSourceId>,
}

fn content_digest(content: &str) -> ContentDigest {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(content.as_bytes()));
    digest
}

/// Registry backed by a `HashMap` behind a tokio `RwLock`.
#[derive(Clone)]
pub struct InMemorySourceRegistry {
    state: Arc<RwLock<RegistryState>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemorySourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySourceRegistry").finish_non_exhaustive()
    }
}

impl Default for InMemorySourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySourceRegistry {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            clock,
        }
    }

    /// Looks up the id a signal was most recently registered under.
    pub async fn id_for_signal(&self, signal_id: &SignalId) -> Option<VerifiedSourceId> {
        self.state.read().await.by_signal.get(signal_id).copied()
    }
}

#[async_trait]
impl VerifiedSourceRegistry for InMemorySourceRegistry {
    async fn register(&self, signal: &RawSignal) -> Result<VerifiedSourceId, RegistryError> {
        let key = (signal.id().clone(), content_digest(signal.content()));
        let mut state = self.state.write().await;
        if let Some(existing) = state.by_content.get(&key).copied() {
            state.by_signal.insert(key.0, existing);
            return Ok(existing);
        }
        if let Some(previous) = state.by_signal.get(signal.id()) {
            warn!(
                signal_id = %signal.id(),
                previous = %previous,
                "Signal content changed since registration, recording a new source"
            );
        }

        let id = VerifiedSourceId::new();
        let source = VerifiedSource::from_signal(id, signal, self.clock.now());
        state.by_signal.insert(signal.id().clone(), id);
        state.by_content.insert(key, id);
        state.sources.insert(id, source);
        Ok(id)
    }

    async fn resolve(&self, id: &VerifiedSourceId) -> Result<Option<VerifiedSource>, RegistryError> {
        Ok(self.state.read().await.sources.get(id).cloned())
    }

    async fn contains(&self, id: &VerifiedSourceId) -> Result<bool, RegistryError> {
        Ok(self.state.read().await.sources.contains_key(id))
    }

    async fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.state.read().await.sources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(id: &str, content: &str) -> RawSignal {
        RawSignal::new(SignalId::new(id).unwrap(), "reddit", content, None)
            .with_author("someone")
            .with_url("https://reddit.com/r/a/1")
    }

    #[tokio::test]
    async fn register_and_resolve() {
        let registry = InMemorySourceRegistry::new();
        let id = registry.register(&signal("s1", "hello")).await.unwrap();

        let source = registry.resolve(&id).await.unwrap().unwrap();
        assert_eq!(source.original_content(), "hello");
        assert_eq!(source.original_author(), Some("someone"));
        assert!(registry.contains(&id).await.unwrap());
        assert_eq!(registry.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn registering_same_signal_twice_keeps_original_record() {
        let registry = InMemorySourceRegistry::new();
        let first = registry.register(&signal("s1", "original")).await.unwrap();
        let second = registry.register(&signal("s1", "original")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.len().await.unwrap(), 1);
        assert_eq!(registry.id_for_signal(&SignalId::new("s1").unwrap()).await, Some(first));
    }

    #[tokio::test]
    async fn edited_signal_gets_a_new_record() {
        let registry = InMemorySourceRegistry::new();
        let first = registry.register(&signal("s1", "original")).await.unwrap();
        let edited = registry.register(&signal("s1", "edited later")).await.unwrap();

        assert_ne!(first, edited);
        assert_eq!(registry.len().await.unwrap(), 2);
        let source = registry.resolve(&edited).await.unwrap().unwrap();
        assert_eq!(source.original_content(), "edited later");
        let old = registry.resolve(&first).await.unwrap().unwrap();
        assert_eq!(old.original_content(), "original");
        assert_eq!(registry.id_for_signal(&SignalId::new("s1").unwrap()).await, Some(edited));

        let reverted = registry.register(&signal("s1", "original")).await.unwrap();
        assert_eq!(reverted, first);
        assert_eq!(registry.len().await.unwrap(), 2);
        assert_eq!(registry.id_for_signal(&SignalId::new("s1").unwrap()).await, Some(first));
    }

    #[tokio::test]
    async fn unknown_id_does_not_resolve() {
        let registry = InMemorySourceRegistry::new();
        let unknown = VerifiedSourceId::new();
        assert!(registry.resolve(&unknown).await.unwrap().is_none());
        assert!(!registry.contains(&unknown).await.unwrap());
    }
}
