//! Delay curves used between reconnect attempts.
//!
//! A [`Backoff`] is a pure function from the retry index to a wait duration. Index `0` is the
//! initial connect (no wait); index `1` is the wait before the first retry, and so on. The
//! stateful side of a reconnect cycle (counting attempts, elapsed budget, jitter memory) lives in
//! [`ReconnectPolicy`](crate::ReconnectPolicy), which walks this curve.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use relink::Backoff;
//!
//! let backoff = Backoff::exponential(Duration::from_millis(100))
//!     .with_max(Duration::from_secs(2))
//!     .unwrap();
//! assert_eq!(backoff.delay(0), Duration::ZERO); // initial connect
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay(6), Duration::from_secs(2)); // capped
//! ```
//!
//! Computations that would overflow saturate to [`MAX_BACKOFF`] (1 day).

use std::fmt;
use std::time::Duration;

/// Upper bound for any computed delay (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors returned while configuring a backoff curve.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackoffError {
    /// Caps only make sense for growing curves.
    #[error("with_max is only valid for linear or exponential backoff")]
    ConstantDoesNotSupportMax,
    #[error("max must be greater than zero")]
    MaxMustBePositive,
    #[error("max ({max:?}) must be >= base ({base:?})")]
    MaxLessThanBase { base: Duration, max: Duration },
    /// Exponential growth factor must be finite and >= 1.0.
    #[error("multiplier must be finite and >= 1.0 (got {0})")]
    InvalidMultiplier(f64),
    #[error("with_multiplier is only valid for exponential backoff")]
    MultiplierRequiresExponential,
}

#[derive(Debug, Clone, PartialEq)]
enum Curve {
    Constant { delay: Duration },
    Linear { base: Duration, max: Option<Duration> },
    Exponential { base: Duration, multiplier: f64, max: Option<Duration> },
}

impl Curve {
    fn delay(&self, retry: usize) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let (raw, max) = match self {
            Curve::Constant { delay } => (*delay, None),
            Curve::Linear { base, max } => {
                let factor = retry.min(u32::MAX as usize) as u32;
                (base.checked_mul(factor).unwrap_or(MAX_BACKOFF), *max)
            }
            Curve::Exponential { base, multiplier, max } => {
                let exponent = retry.saturating_sub(1).min(i32::MAX as usize) as i32;
                let nanos = (base.as_nanos() as f64 * multiplier.powi(exponent)).round();
                let grown = if nanos.is_finite() && nanos < MAX_BACKOFF.as_nanos() as f64 {
                    Duration::from_nanos(nanos as u64)
                } else {
                    MAX_BACKOFF
                };
                (grown, *max)
            }
        };
        max.map(|m| raw.min(m)).unwrap_or(raw).min(MAX_BACKOFF)
    }
}

/// Delay curve: constant, linear, or exponential with an optional cap.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    curve: Curve,
}

impl Backoff {
    /// Wait the same `delay` before every retry.
    pub fn constant(delay: Duration) -> Self {
        Self { curve: Curve::Constant { delay } }
    }

    /// Wait `base * retry`.
    pub fn linear(base: Duration) -> Self {
        Self { curve: Curve::Linear { base, max: None } }
    }

    /// Wait `base * 2^(retry - 1)`. Use [`Backoff::with_multiplier`] for other growth factors.
    pub fn exponential(base: Duration) -> Self {
        Self { curve: Curve::Exponential { base, multiplier: 2.0, max: None } }
    }

    /// Preset constructor for values known to be valid.
    pub(crate) fn exponential_capped(base: Duration, multiplier: f64, max: Duration) -> Self {
        Self { curve: Curve::Exponential { base, multiplier, max: Some(max) } }
    }

    /// Change the growth factor of an exponential curve.
    pub fn with_multiplier(mut self, multiplier: f64) -> Result<Self, BackoffError> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(BackoffError::InvalidMultiplier(multiplier));
        }
        match &mut self.curve {
            Curve::Exponential { multiplier: existing, .. } => {
                *existing = multiplier;
                Ok(self)
            }
            _ => Err(BackoffError::MultiplierRequiresExponential),
        }
    }

    /// Cap every delay at `max`. Rejected for constant curves, zero caps, and caps below `base`.
    pub fn with_max(mut self, max: Duration) -> Result<Self, BackoffError> {
        if max.is_zero() {
            return Err(BackoffError::MaxMustBePositive);
        }
        match &mut self.curve {
            Curve::Linear { base, max: existing } | Curve::Exponential { base, max: existing, .. } => {
                if max < *base {
                    return Err(BackoffError::MaxLessThanBase { base: *base, max });
                }
                *existing = Some(max);
                Ok(self)
            }
            Curve::Constant { .. } => Err(BackoffError::ConstantDoesNotSupportMax),
        }
    }

    /// Delay before retry number `retry` (0 = initial connect, no delay).
    pub fn delay(&self, retry: usize) -> Duration {
        self.curve.delay(retry)
    }

    /// The largest delay this curve can produce, if it is bounded below [`MAX_BACKOFF`].
    pub fn cap(&self) -> Option<Duration> {
        match &self.curve {
            Curve::Constant { delay } => Some(*delay),
            Curve::Linear { max, .. } | Curve::Exponential { max, .. } => *max,
        }
    }
}

impl fmt::Display for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.curve {
            Curve::Constant { delay } => write!(f, "constant({:?})", delay),
            Curve::Linear { base, max } => write!(f, "linear({:?}, max={:?})", base, max),
            Curve::Exponential { base, multiplier, max } => {
                write!(f, "exponential({:?} x{}, max={:?})", base, multiplier, max)
            }
        }
    }
}
