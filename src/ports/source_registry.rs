//! Verified Source Registry Port - the single source of truth for provenance.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::VerifiedSourceId;
use crate::domain::signal::RawSignal;
use crate::domain::trigger::VerifiedSource;

/// Immutable store of signal origins, addressable only by opaque id.
///
/// Records are never updated after registration. Registering the same
/// signal id twice returns the original record's id.
#[async_trait]
pub trait VerifiedSourceRegistry: Send + Sync {
    async fn register(&self, signal: &RawSignal) -> Result<VerifiedSourceId, RegistryError>;

    async fn resolve(&self, id: &VerifiedSourceId) -> Result<Option<VerifiedSource>, RegistryError>;

    async fn contains(&self, id: &VerifiedSourceId) -> Result<bool, RegistryError> {
        Ok(self.resolve(id).await?.is_some())
    }

    async fn len(&self) -> Result<usize, RegistryError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}
