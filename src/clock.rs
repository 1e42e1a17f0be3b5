//! Time source port.
//!
//! All timestamps in this crate are wall-clock milliseconds since the Unix
//! epoch. The clock is injected so tests can drive virtual time.

use std::cell::Cell;
use std::time::Duration;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Source of the current time.
pub trait Clock {
    /// Current wall-clock time in milliseconds.
    fn now_millis(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> Millis {
        (**self).now_millis()
    }
}

/// Real wall clock backed by `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    /// Clock frozen at `start` until moved.
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(ttl_millis(by)));
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.now.get()
    }
}

/// Convert a TTL to signed milliseconds, saturating at `i64::MAX`.
pub fn ttl_millis(ttl: Duration) -> Millis {
    Millis::try_from(ttl.as_millis()).unwrap_or(Millis::MAX)
}

/// Absolute expiry for something created at `now` that lives for `ttl`.
pub fn expiry_after(now: Millis, ttl: Duration) -> Millis {
    now.saturating_add(ttl_millis(ttl))
}
