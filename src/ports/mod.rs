//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TriggerSynthesizer` - the external LLM collaborator
//! - `VerifiedSourceRegistry` - immutable store of true signal origins
//! - `Clock` - injectable time source for the cache
//! - `RefreshFetcher` - per-key refresh callback held by the trigger cache

mod clock;
mod refresh;
mod source_registry;
mod trigger_synthesizer;

pub use clock::Clock;
pub use refresh::{refresh_fetcher, FetchError, RefreshFetcher};
pub use source_registry::{RegistryError, VerifiedSourceRegistry};
pub use trigger_synthesizer::{SynthesisError, TriggerSynthesizer};
