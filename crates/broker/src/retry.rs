//! Fixed-delay, bounded-attempt retry for the initial broker connection.
//!
//! Unlike an open-ended reconnect loop, [`retry_fixed`] gives up after
//! [`RetryPolicy::max_attempts`] so startup can fail fast when the broker
//! is unreachable.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How many times to try and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RetryError {
    /// Every attempt failed.
    #[error("Gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    /// The cancellation token fired before an attempt succeeded.
    #[error("Retry cancelled")]
    Cancelled,
}

/// Run `op` until it succeeds, the attempts run out, or `cancel` fires.
///
/// `what` names the operation in log lines.
pub async fn retry_fixed<T, E, F, Fut>(
    what: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(what, attempt, "Retry cancelled");
                return Err(RetryError::Cancelled);
            }
            result = op(attempt) => match result {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(what, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(
                        what,
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %e,
                        "Attempt failed",
                    );
                    last_error = e.to_string();
                }
            }
        }

        if attempt < policy.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                _ = tokio::time::sleep(policy.delay) => {}
            }
        }
    }

    tracing::error!(what, attempts = policy.max_attempts, error = %last_error, "Giving up");
    Err(RetryError::Exhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}
