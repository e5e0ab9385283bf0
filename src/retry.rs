//! Cancellable retry loop driven by a [`BackoffPolicy`].
//!
//! Semantics:
//! - The policy is reset before the first attempt, so every call walks a fresh interval sequence.
//! - Each attempt reports `Failure::Transient` (retry after the next interval) or
//!   `Failure::Permanent` (stop now, regardless of remaining budget).
//! - `None` from [`BackoffPolicy::next_interval`] stops the loop with the last failure.
//! - The cancellation token is raced against every attempt and every wait; cancellation wins
//!   ties and stops the loop immediately.
//!
//! Example
//! ```rust
//! use relink::retry::{retry_with_backoff, Failure};
//! use relink::{Backoff, InstantSleeper, Jitter, ReconnectPolicy};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut policy = ReconnectPolicy::builder()
//!     .backoff(Backoff::constant(Duration::from_millis(10)))
//!     .with_jitter(Jitter::None)
//!     .max_attempts(3)
//!     .build()
//!     .unwrap();
//! let cancel = CancellationToken::new();
//! let result = retry_with_backoff(&mut policy, &InstantSleeper, &cancel, |attempt| async move {
//!     if attempt < 3 { Err(Failure::transient("not yet")) } else { Ok(attempt) }
//! })
//! .await;
//! assert_eq!(result.unwrap(), 3);
//! # });
//! ```

use crate::policy::BackoffPolicy;
use crate::Sleeper;
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Outcome of a single failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<E> {
    /// Worth another attempt after the next backoff interval.
    Transient(E),
    /// Stop retrying immediately.
    Permanent(E),
}

impl<E> Failure<E> {
    pub fn transient(err: E) -> Self {
        Failure::Transient(err)
    }

    pub fn permanent(err: E) -> Self {
        Failure::Permanent(err)
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Failure::Permanent(_))
    }

    pub fn into_inner(self) -> E {
        match self {
            Failure::Transient(e) | Failure::Permanent(e) => e,
        }
    }
}

/// Why the loop gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// An attempt reported a permanent failure.
    Permanent(E),
    /// The policy produced no further interval.
    Exhausted { attempts: usize, last: E },
    /// The cancellation token fired.
    Cancelled,
}

/// Run `operation` until it succeeds, fails permanently, exhausts `policy`, or `cancel` fires.
///
/// `operation` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, Op, Fut>(
    policy: &mut dyn BackoffPolicy,
    sleeper: &dyn Sleeper,
    cancel: &CancellationToken,
    mut operation: Op,
) -> Result<T, RetryError<E>>
where
    E: fmt::Display,
    Op: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, Failure<E>>>,
{
    policy.reset();
    let mut attempt = 0usize;
    loop {
        attempt += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            outcome = operation(attempt) => outcome,
        };
        let last = match outcome {
            Ok(value) => return Ok(value),
            Err(Failure::Permanent(e)) => return Err(RetryError::Permanent(e)),
            Err(Failure::Transient(e)) => e,
        };

        let Some(delay) = policy.next_interval() else {
            return Err(RetryError::Exhausted { attempts: attempt, last });
        };
        tracing::debug!(
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %last,
            "attempt failed; backing off"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            _ = sleeper.sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Backoff, InstantSleeper, Jitter, ReconnectPolicy, TrackingSleeper};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn policy(max_attempts: usize) -> ReconnectPolicy {
        ReconnectPolicy::builder()
            .backoff(Backoff::linear(Duration::from_millis(100)))
            .with_jitter(Jitter::None)
            .max_attempts(max_attempts)
            .max_elapsed(None)
            .build()
            .expect("valid policy")
    }

    #[tokio::test]
    async fn success_on_first_attempt_never_sleeps() {
        let sleeper = TrackingSleeper::new();
        let cancel = CancellationToken::new();
        let result: Result<u8, RetryError<&str>> =
            retry_with_backoff(&mut policy(5), &sleeper, &cancel, |_| async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn transient_failures_follow_the_interval_sequence() {
        let sleeper = TrackingSleeper::new();
        let cancel = CancellationToken::new();
        let result = retry_with_backoff(&mut policy(5), &sleeper, &cancel, |attempt| async move {
            if attempt <= 2 {
                Err(Failure::transient("refused"))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result, Ok(3));
        assert_eq!(sleeper.calls(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
    }

    #[tokio::test]
    async fn permanent_failure_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let counter = calls.clone();
        let result: Result<(), _> =
            retry_with_backoff(&mut policy(5), &InstantSleeper, &cancel, move |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(Failure::permanent("password authentication failed"))
                }
            })
            .await;
        assert_eq!(result, Err(RetryError::Permanent("password authentication failed")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempts_and_last_failure() {
        let cancel = CancellationToken::new();
        let result: Result<(), _> =
            retry_with_backoff(&mut policy(3), &InstantSleeper, &cancel, |attempt| async move {
                Err(Failure::transient(attempt))
            })
            .await;
        assert_eq!(result, Err(RetryError::Exhausted { attempts: 3, last: 3 }));
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_the_first_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), RetryError<&str>> =
            retry_with_backoff(&mut policy(3), &InstantSleeper, &cancel, |_| async { Ok(()) })
                .await;
        assert_eq!(result, Err(RetryError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_long_wait() {
        let mut policy = ReconnectPolicy::builder()
            .backoff(Backoff::constant(Duration::from_secs(3600)))
            .with_jitter(Jitter::None)
            .build()
            .expect("valid policy");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let start = tokio::time::Instant::now();
        let result: Result<(), _> =
            retry_with_backoff(&mut policy, &crate::TokioSleeper, &cancel, |_| async {
                Err(Failure::transient("refused"))
            })
            .await;
        assert_eq!(result, Err(RetryError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(3600));
    }

    #[test]
    fn failure_helpers() {
        assert!(Failure::permanent(1).is_permanent());
        assert!(!Failure::transient(1).is_permanent());
        assert_eq!(Failure::transient(9).into_inner(), 9);
    }
}
