//! Stateful backoff policies for reconnect cycles.
//!
//! A [`BackoffPolicy`] hands out the wait before each retry and decides when a cycle is over.
//! [`ReconnectPolicy`] is the stock implementation: it walks a [`Backoff`] curve, applies
//! [`Jitter`], and stops after `max_attempts` total connect attempts or once `max_elapsed` has
//! passed since the cycle started.
//!
//! Semantics:
//! - `reset` starts a new cycle: retry counter back to zero, elapsed budget restarted, jitter
//!   memory cleared. The reconnect loop calls it before the first attempt.
//! - `next_interval` is called after each failed attempt. `None` means exhausted.
//! - `max_attempts` counts total attempts (initial connect + retries). `None` is unbounded.
//!
//! Example
//! ```rust
//! use relink::{Backoff, BackoffPolicy, Jitter, ReconnectPolicy};
//! use std::time::Duration;
//!
//! let mut policy = ReconnectPolicy::builder()
//!     .backoff(Backoff::exponential(Duration::from_millis(100)))
//!     .with_jitter(Jitter::None)
//!     .max_attempts(3)
//!     .build()
//!     .unwrap();
//! policy.reset();
//! assert_eq!(policy.next_interval(), Some(Duration::from_millis(100)));
//! assert_eq!(policy.next_interval(), Some(Duration::from_millis(200)));
//! assert_eq!(policy.next_interval(), None); // third attempt was the last
//! ```

use crate::backoff::Backoff;
use crate::clock::{Clock, MonotonicClock};
use crate::jitter::Jitter;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Source of waits between reconnect attempts.
pub trait BackoffPolicy: Send + Sync + fmt::Debug {
    /// Start a fresh sequence.
    fn reset(&mut self);

    /// Wait before the next attempt, or `None` when the cycle is exhausted.
    fn next_interval(&mut self) -> Option<Duration>;
}

impl<P: BackoffPolicy + ?Sized> BackoffPolicy for Box<P> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn next_interval(&mut self) -> Option<Duration> {
        (**self).next_interval()
    }
}

/// Errors produced while building a reconnect policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// `max_attempts` must be > 0 when set.
    #[error("max_attempts must be > 0 (got {0})")]
    InvalidMaxAttempts(usize),
    /// `max_elapsed` must be > 0 when set.
    #[error("max_elapsed must be greater than zero")]
    ZeroMaxElapsed,
}

/// Backoff curve + jitter + stop conditions.
#[derive(Clone)]
pub struct ReconnectPolicy {
    backoff: Backoff,
    jitter: Jitter,
    max_attempts: Option<usize>,
    max_elapsed: Option<Duration>,
    clock: Arc<dyn Clock>,
    retries: usize,
    started_at: Option<u64>,
}

impl fmt::Debug for ReconnectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconnectPolicy")
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter)
            .field("max_attempts", &self.max_attempts)
            .field("max_elapsed", &self.max_elapsed)
            .field("retries", &self.retries)
            .finish()
    }
}

impl ReconnectPolicy {
    pub fn builder() -> ReconnectPolicyBuilder {
        ReconnectPolicyBuilder::new()
    }

    pub(crate) fn from_parts(
        backoff: Backoff,
        jitter: Jitter,
        max_attempts: Option<usize>,
        max_elapsed: Option<Duration>,
    ) -> Self {
        Self {
            backoff,
            jitter,
            max_attempts,
            max_elapsed,
            clock: Arc::new(MonotonicClock::default()),
            retries: 0,
            started_at: None,
        }
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }

    pub fn max_elapsed(&self) -> Option<Duration> {
        self.max_elapsed
    }

    /// Retries handed out since the last reset.
    pub fn retries(&self) -> usize {
        self.retries
    }
}

impl BackoffPolicy for ReconnectPolicy {
    fn reset(&mut self) {
        self.retries = 0;
        self.started_at = Some(self.clock.now_millis());
        self.jitter.reset();
    }

    fn next_interval(&mut self) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if self.retries + 1 >= max {
                return None;
            }
        }
        if let Some(budget) = self.max_elapsed {
            let started = *self.started_at.get_or_insert_with(|| self.clock.now_millis());
            if self.clock.elapsed_since(started) >= budget {
                return None;
            }
        }
        self.retries += 1;
        let delay = self.backoff.delay(self.retries);
        Some(self.jitter.apply(delay))
    }
}

/// Builder for [`ReconnectPolicy`]. Starts from the library default (see
/// [`presets::default_policy`](crate::presets::default_policy)).
pub struct ReconnectPolicyBuilder {
    backoff: Backoff,
    jitter: Jitter,
    max_attempts: Option<usize>,
    max_elapsed: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl ReconnectPolicyBuilder {
    pub fn new() -> Self {
        Self {
            backoff: crate::presets::default_backoff(),
            jitter: Jitter::equal(),
            max_attempts: None,
            max_elapsed: Some(crate::presets::DEFAULT_MAX_ELAPSED),
            clock: Arc::new(MonotonicClock::default()),
        }
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Cap total connect attempts per cycle. Must be > 0.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Remove the attempt cap.
    pub fn unbounded_attempts(mut self) -> Self {
        self.max_attempts = None;
        self
    }

    /// Stop a cycle once this much time has passed since it started. `None` removes the budget.
    pub fn max_elapsed(mut self, budget: Option<Duration>) -> Self {
        self.max_elapsed = budget;
        self
    }

    /// Provide a custom clock for the elapsed budget.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> Result<ReconnectPolicy, BuildError> {
        if self.max_attempts == Some(0) {
            return Err(BuildError::InvalidMaxAttempts(0));
        }
        if self.max_elapsed == Some(Duration::ZERO) {
            return Err(BuildError::ZeroMaxElapsed);
        }
        let mut policy = ReconnectPolicy::from_parts(
            self.backoff,
            self.jitter,
            self.max_attempts,
            self.max_elapsed,
        );
        policy.clock = self.clock;
        Ok(policy)
    }
}

impl Default for ReconnectPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
