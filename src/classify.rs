//! Retryability classification for driver errors.
//!
//! An error is retryable when it says the connection itself is unhealthy: already closed,
//! timed out, failed while being established, or flagged by the driver as safe to re-issue.
//! Anything else (syntax errors, constraint violations, authentication failures) is a logical
//! failure and goes straight back to the caller.

use std::error::Error;
use std::io;

/// Phrase drivers put in the message of a call made on a closed connection. Matched textually
/// because drivers do not always attach a structured code to this case.
pub const CONN_CLOSED_PHRASE: &str = "conn closed";

/// Classification hooks a driver's error type exposes. Every hook defaults to `false`.
pub trait DriverError: Error + Send + Sync + 'static {
    /// The failure was a timeout.
    fn is_timeout(&self) -> bool {
        false
    }

    /// The failure is, or wraps, a failure to establish a connection.
    fn is_connect_error(&self) -> bool {
        false
    }

    /// The driver knows the request never reached the server, so re-issuing it is safe.
    fn is_safe_to_retry(&self) -> bool {
        false
    }
}

/// Whether `err` indicates a severed or unhealthy connection.
pub fn is_retryable<E: DriverError>(err: &E) -> bool {
    mentions_closed_connection(err)
        || err.is_timeout()
        || err.is_connect_error()
        || err.is_safe_to_retry()
}

fn mentions_closed_connection(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.to_string().contains(CONN_CLOSED_PHRASE) {
            return true;
        }
        current = e.source();
    }
    false
}

impl DriverError for io::Error {
    fn is_timeout(&self) -> bool {
        self.kind() == io::ErrorKind::TimedOut
    }

    fn is_connect_error(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::ConnectionRefused
                | io::ErrorKind::NotConnected
                | io::ErrorKind::AddrNotAvailable
        )
    }

    fn is_safe_to_retry(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::Interrupted
        )
    }
}
