//! Verified source registry adapters.

mod in_memory;

pub use in_memory::InMemorySourceRegistry;
