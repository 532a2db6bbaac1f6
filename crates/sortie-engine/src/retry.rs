//! Bounded retry with recovery.
//!
//! [`attempt`] runs an [`Attempt`] up to [`RetryPolicy::max_attempts`]
//! times. After each failure it calls [`Attempt::recover`], waits the
//! recovery delay and tries again. It never returns an error: the outcome
//! carries the value of the first success, or the last error once the
//! budget is spent.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// Default attempt budget per action.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

// ─────────────────────────────────────────────────────────────────────────────
// Policy
// ─────────────────────────────────────────────────────────────────────────────

/// Retry budget and pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed wait after recovering from a failure.
    pub recovery_delay: Duration,
}

impl RetryPolicy {
    /// Five attempts with the given recovery delay.
    pub fn new(recovery_delay: Duration) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            recovery_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Action
// ─────────────────────────────────────────────────────────────────────────────

/// A retryable action with its recovery step.
#[async_trait]
pub trait Attempt: Send {
    /// Value of a successful run.
    type Output: Send;
    /// Failure of a single run.
    type Error: fmt::Display + Send + Sync;

    /// Run once. `attempt` is 1-based.
    async fn run(&mut self, attempt: u32) -> Result<Self::Output, Self::Error>;

    /// Restore a usable state after `run` failed with `error`.
    async fn recover(&mut self, attempt: u32, error: &Self::Error);
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a retried action.
#[derive(Clone, Debug)]
pub struct RetryOutcome<T, E> {
    /// Value of the successful run, if any.
    pub value: Option<T>,
    /// Last error when every attempt failed.
    pub error: Option<E>,
    /// Runs made (1-based).
    pub attempts: u32,
}

impl<T, E> RetryOutcome<T, E> {
    /// Whether a run succeeded.
    pub fn is_success(&self) -> bool {
        self.value.is_some()
    }
}

/// Run `action` under `policy`.
pub async fn attempt<A: Attempt>(
    policy: &RetryPolicy,
    action: &mut A,
) -> RetryOutcome<A::Output, A::Error> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for n in 1..=max_attempts {
        match action.run(n).await {
            Ok(value) => {
                return RetryOutcome {
                    value: Some(value),
                    error: None,
                    attempts: n,
                };
            }
            Err(e) => {
                action.recover(n, &e).await;
                tokio::time::sleep(policy.recovery_delay).await;
                last_error = Some(e);
            }
        }
    }

    RetryOutcome {
        value: None,
        error: last_error,
        attempts: max_attempts,
    }
}
