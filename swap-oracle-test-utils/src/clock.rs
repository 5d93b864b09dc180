//! A controllable [`Clock`] for deterministic coordinator/sweeper tests.

use std::sync::atomic::{AtomicU64, Ordering};

use swap_oracle_types::Clock;

/// A clock whose value is set explicitly by the test, rather than
/// tracking real wall-clock time.
pub struct FakeClock(AtomicU64);

impl FakeClock {
    /// Builds a clock starting at `now`.
    pub fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    /// Advances the clock by `delta` seconds.
    pub fn advance(&self, delta: u64) {
        self.0.fetch_add(delta, Ordering::SeqCst);
    }

    /// Sets the clock to an explicit value.
    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}
