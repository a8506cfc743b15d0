//! Clock port.
//!
//! Lifecycle derivation, milestone arithmetic, and audit stamping all take
//! the current instant as input. Injecting the clock keeps them testable at
//! fixed points in time.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
