//! Deadline and retry policy for remote steps

use crate::{PlannerConfig, PlannerError};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Why a remote step gave up
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StepError {
    /// Every attempt missed the deadline
    TimedOut {
        operation: &'static str,
        after: Duration,
    },
    /// The last attempt failed with this backend error
    Failed(String),
}

impl StepError {
    /// Turn into a planner error; backend failures go through `wrap`
    pub(crate) fn into_planner(self, wrap: impl FnOnce(String) -> PlannerError) -> PlannerError {
        match self {
            StepError::TimedOut { operation, after } => PlannerError::Timeout { operation, after },
            StepError::Failed(reason) => wrap(reason),
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::TimedOut { operation, after } => {
                write!(f, "{} timed out after {:?}", operation, after)
            }
            StepError::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// Runs each remote call under a deadline, retrying with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StepPolicy {
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl StepPolicy {
    pub(crate) fn new(timeout: Duration, max_retries: u32, backoff: Duration) -> Self {
        Self {
            timeout,
            max_retries,
            backoff,
        }
    }

    pub(crate) fn from_config(config: &PlannerConfig) -> Self {
        Self::new(
            config.step_timeout(),
            config.max_retries,
            config.retry_backoff(),
        )
    }

    /// Run `call` until it succeeds or the attempts are exhausted
    ///
    /// `call` is invoked once per attempt, so it must build a fresh future.
    pub(crate) async fn run<T, E, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, StepError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let attempts = self.max_retries + 1;
        let mut last_error = StepError::Failed(format!("{} was never attempted", operation));

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    tracing::debug!(operation, attempt, error = %e, "Remote step failed");
                    last_error = StepError::Failed(e.to_string());
                }
                Err(_) => {
                    tracing::debug!(operation, attempt, "Remote step timed out");
                    last_error = StepError::TimedOut {
                        operation,
                        after: self.timeout,
                    };
                }
            }

            if attempt < attempts {
                // Exponential backoff: base, 2x base, 4x base, ...
                let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error)
    }
}
