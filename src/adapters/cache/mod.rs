//! Trigger cache adapters.
//!
//! - `InMemoryTriggerCache` - TTL, stale-while-revalidate, LRU eviction
//! - `CacheRefresher` - periodic refresh of stale entries
//! - `CacheKey` - `trigger:<profileId>[:<segment>][:<filterHash>]`

mod entry;
mod in_memory;
mod key;
mod refresher;

pub use entry::{CacheEntry, CacheRead, CacheStats, CacheStatus, EntryInfo, FetchOutcome};
pub use in_memory::{CacheError, CacheSettings, InMemoryTriggerCache};
pub use key::{CacheKey, CacheKeyBuilder, CacheKeyError};
pub use refresher::{CacheRefresher, CacheRefresherConfig};
