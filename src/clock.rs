//! Clock abstraction used to enforce a reconnect cycle's elapsed-time budget.

use std::time::{Duration, Instant};

/// Millisecond clock so the elapsed budget can be driven by hand in tests.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now_millis(&self) -> u64;

    /// Time elapsed since `start_millis`, clamped at zero.
    fn elapsed_since(&self, start_millis: u64) -> Duration {
        Duration::from_millis(self.now_millis().saturating_sub(start_millis))
    }
}

/// Monotonic clock backed by `Instant::now()`, counted from construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
