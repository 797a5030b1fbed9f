//! Clock Port - injectable time source.

use crate::domain::foundation::Timestamp;

/// Source of "now" for anything time-dependent outside pure scoring.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
