//! Error type returned by [`ResilientConnection`](crate::ResilientConnection).
use crate::retry::RetryError;
use std::fmt;

/// Unified error for connection lifecycle and delegated operations.
///
/// `E` is the driver's native error type. Errors the classifier deems non-retryable are passed
/// through untouched as [`ReconnectError::Driver`].
#[derive(Debug)]
pub enum ReconnectError<E> {
    /// Construction or reconnect attempted with an empty target.
    NoTarget,
    /// The caller's cancellation token fired while connecting, waiting, or running a call.
    Cancelled,
    /// No live connection is available. Only reachable when reconnect failures are suppressed.
    NotConnected,
    /// The backoff policy ran out while re-establishing the connection.
    Exhausted { attempts: usize, last: E },
    /// A call failed with a retryable error and the reconnect that followed failed too.
    ReconnectFailed { reconnect: Box<ReconnectError<E>>, original: E },
    /// Driver-native error, unchanged.
    Driver(E),
}

impl<E: fmt::Display> fmt::Display for ReconnectError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTarget => write!(f, "no connection target provided"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::NotConnected => write!(f, "no live connection"),
            Self::Exhausted { attempts, last } => {
                write!(f, "gave up connecting after {} attempts; last error: {}", attempts, last)
            }
            Self::ReconnectFailed { reconnect, original } => {
                write!(f, "error while reconnecting: {}, original error: {}", reconnect, original)
            }
            Self::Driver(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ReconnectError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Driver(e) => Some(e),
            Self::Exhausted { last, .. } => Some(last),
            Self::ReconnectFailed { reconnect, .. } => Some(reconnect.as_ref()),
            _ => None,
        }
    }
}

impl<E> From<RetryError<E>> for ReconnectError<E> {
    fn from(err: RetryError<E>) -> Self {
        match err {
            RetryError::Permanent(e) => Self::Driver(e),
            RetryError::Exhausted { attempts, last } => Self::Exhausted { attempts, last },
            RetryError::Cancelled => Self::Cancelled,
        }
    }
}

impl<E> ReconnectError<E> {
    pub fn is_no_target(&self) -> bool {
        matches!(self, Self::NoTarget)
    }

    /// True for `Cancelled`, including a cancellation that interrupted a post-failure reconnect.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::ReconnectFailed { reconnect, .. } => reconnect.is_cancelled(),
            _ => false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn is_reconnect_failed(&self) -> bool {
        matches!(self, Self::ReconnectFailed { .. })
    }

    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// Borrow the driver error if this is a pass-through.
    pub fn as_driver(&self) -> Option<&E> {
        match self {
            Self::Driver(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_driver(self) -> Option<E> {
        match self {
            Self::Driver(e) => Some(e),
            _ => None,
        }
    }

    /// The call failure that triggered a failed reconnect.
    pub fn original(&self) -> Option<&E> {
        match self {
            Self::ReconnectFailed { original, .. } => Some(original),
            _ => None,
        }
    }

    /// Why the post-failure reconnect failed.
    pub fn reconnect_error(&self) -> Option<&ReconnectError<E>> {
        match self {
            Self::ReconnectFailed { reconnect, .. } => Some(reconnect),
            _ => None,
        }
    }
}
