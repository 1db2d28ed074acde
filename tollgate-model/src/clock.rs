//! Time source abstraction.
//!
//! Every "is it expired yet" question in the auth domain is answered
//! against a [`Clock`]. Production code uses [`SystemClock`]; tests drive a
//! [`ManualClock`] forward to cross expiry boundaries deterministically.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Trait for providing the current UTC time
pub trait Clock: Send + Sync + std::fmt::Debug + 'static {
    /// Get the current UTC datetime
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that reads the system wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for testing
///
/// Clones share the same underlying instant, so a test can hand one copy
/// to a service and keep another to move time forward.
#[derive(Clone, Debug)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a manual clock starting at the current wall-clock time
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    /// Create a manual clock starting at a specific time
    pub fn new_at(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `duration`
    pub fn advance(&self, duration: Duration) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = *current + duration;
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
