//! A standalone retry entry point for call sites that are not wrapped in a
//! Tower [`tower::Service`] — the job queue, quota enforcement and database
//! batch executor all invoke fallible async closures directly and need the
//! same strategy/jitter/budget/cancellation semantics as [`crate::Retry`]
//! without building a whole `Service` around a single call.

use crate::config::RetryConfig;
use ccp_core::cancellation::CancellationToken;
use std::fmt;
use std::future::Future;

/// The structured failure returned by [`retry_call`] once a call is given up
/// on, either through attempt/budget exhaustion or cancellation.
#[derive(Debug, Clone)]
pub struct RetryError<E> {
    /// Total attempts made, including the initial one. Always `0` when the
    /// failure is a budget refusal: that's the sentinel distinguishing "the
    /// shared retry budget was exhausted" from ordinary attempt exhaustion,
    /// which always reports the real attempt count.
    pub attempts: usize,
    /// The last error observed, if the call ever got to run. `None` only
    /// when cancelled before the first attempt.
    pub last_error: Option<E>,
    /// Set when the failure was caused by `cancellation_token` being set
    /// rather than by attempt or budget exhaustion.
    pub cancelled: bool,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cancelled {
            return write!(f, "retry cancelled after {} attempt(s)", self.attempts);
        }
        match &self.last_error {
            Some(e) => write!(f, "retry failed after {} attempt(s): {e}", self.attempts),
            None => write!(f, "retry failed after {} attempt(s)", self.attempts),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Invokes `f(req.clone())` repeatedly per `config`, honoring
/// `cancellation_token` between attempts. Unlike [`crate::Retry`], this
/// does not require `f` to be a `Service` and does not box the error as
/// `S::Error` — it returns the fully structured [`RetryError`].
pub async fn retry_call<Req, T, E, F, Fut>(
    config: &RetryConfig<Req, E>,
    cancellation_token: &CancellationToken,
    req: Req,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    Req: Clone,
    F: FnMut(Req) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts_source.get_max_attempts(&req);
    let sampling = config.policy.error_sampling();
    let effective_max_attempts = if sampling < 1.0 && rand::random::<f64>() >= sampling {
        max_attempts.min(1)
    } else {
        max_attempts
    };

    let mut attempt = 0usize;
    loop {
        if cancellation_token.is_cancelled() {
            return Err(RetryError {
                attempts: attempt,
                last_error: None,
                cancelled: true,
            });
        }

        let result = f(req.clone()).await;
        match result {
            Ok(value) => {
                if let Some(ref budget) = config.budget {
                    budget.deposit();
                }
                return Ok(value);
            }
            Err(error) => {
                attempt += 1;

                if !config.policy.should_retry(&error) {
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: Some(error),
                        cancelled: false,
                    });
                }

                if attempt >= effective_max_attempts {
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: Some(error),
                        cancelled: false,
                    });
                }

                if let Some(ref budget) = config.budget {
                    if !budget.try_withdraw() {
                        return Err(RetryError {
                            attempts: 0,
                            last_error: Some(error),
                            cancelled: false,
                        });
                    }
                }

                let delay = config.policy.next_backoff(attempt - 1, &error);
                if cancellation_token.sleep_cancellable(delay).await.is_err() {
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: Some(error),
                        cancelled: true,
                    });
                }
            }
        }
    }
}
