//! Clock Port - source of the current time.
//!
//! Caches and call budgets read time through this port so expiry and
//! rolling windows can be driven deterministically in tests.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
pub trait Clock: Send + Sync {
    /// The current moment.
    fn now(&self) -> Timestamp;
}
