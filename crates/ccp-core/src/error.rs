//! Common error types shared by every control-plane subsystem.
//!
//! [`ControlError`] is the unified error type returned at the seams between
//! the retry engine, rate limiter, coalescer and the application code they
//! wrap. Composing several of these layers around a fallible operation would
//! otherwise require a `From` impl per layer per call site; wrapping the
//! application error in `ControlError<E>` avoids that entirely.

use std::fmt;
use std::time::Duration;

/// A common error type that wraps every control-plane layer's failure mode
/// plus the wrapped operation's own error.
///
/// # Type Parameters
///
/// - `E`: the application-specific error type of the wrapped operation.
#[derive(Debug, Clone)]
pub enum ControlError<E> {
    /// The operation did not complete before its deadline.
    Timeout {
        /// The layer that enforced the deadline (e.g. `"retry"`, `"batch"`).
        layer: &'static str,
    },

    /// A [`crate::cancellation::CancellationToken`] was set while the
    /// operation was in flight or between retry attempts.
    Cancelled,

    /// A rate limiter rejected the call.
    RateLimited {
        /// How long the caller should wait before retrying, if known.
        retry_after: Option<Duration>,
    },

    /// The wrapped operation returned an error.
    Application(E),
}

impl<E> fmt::Display for ControlError<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Timeout { layer } => write!(f, "timeout in {layer}"),
            ControlError::Cancelled => write!(f, "operation cancelled"),
            ControlError::RateLimited { retry_after } => match retry_after {
                Some(d) => write!(f, "rate limited, retry after {d:?}"),
                None => write!(f, "rate limited"),
            },
            ControlError::Application(e) => write!(f, "{e}"),
        }
    }
}

impl<E> std::error::Error for ControlError<E> where E: std::error::Error {}

impl<E> ControlError<E> {
    /// Returns `true` if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ControlError::Timeout { .. })
    }

    /// Returns `true` if this is a cancellation error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ControlError::Cancelled)
    }

    /// Returns `true` if this is a rate-limit rejection.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ControlError::RateLimited { .. })
    }

    /// Returns `true` if this wraps an application error.
    pub fn is_application(&self) -> bool {
        matches!(self, ControlError::Application(_))
    }

    /// Extracts the application error, if this is the `Application` variant.
    pub fn application_error(self) -> Option<E> {
        match self {
            ControlError::Application(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the application error using `f`, leaving other variants untouched.
    pub fn map_application<F, T>(self, f: F) -> ControlError<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            ControlError::Timeout { layer } => ControlError::Timeout { layer },
            ControlError::Cancelled => ControlError::Cancelled,
            ControlError::RateLimited { retry_after } => ControlError::RateLimited { retry_after },
            ControlError::Application(e) => ControlError::Application(f(e)),
        }
    }
}
