//! Retry with jittered backoff for fetch operations.
//!
//! Every remote fetch boundary in the harvester goes through
//! [`RetryPolicy::run`]. Failures never escape it: the caller gets a
//! [`RetryOutcome`] that is either the value or the last error after the
//! attempt budget ran out.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::{thread_rng, Rng};
use tracing::{debug, error, warn};

use crate::constants::{MAX_FETCH_ATTEMPTS, RETRY_WAIT_MAX, RETRY_WAIT_MIN};

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Inclusive lower bound of the wait between attempts.
    pub wait_min: Duration,
    /// Exclusive upper bound of the wait between attempts.
    pub wait_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_FETCH_ATTEMPTS,
            wait_min: RETRY_WAIT_MIN,
            wait_max: RETRY_WAIT_MAX,
        }
    }
}

/// Result of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Success(T),
    Exhausted { attempts: u32, last_error: E },
}

impl RetryPolicy {
    /// Draw a wait uniformly from `[wait_min, wait_max)` at millisecond resolution.
    #[must_use]
    pub fn jittered_wait(&self) -> Duration {
        let min_ms = u64::try_from(self.wait_min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.wait_max.as_millis()).unwrap_or(u64::MAX);
        if max_ms <= min_ms {
            return self.wait_min;
        }
        Duration::from_millis(thread_rng().gen_range(min_ms..max_ms))
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. `label` only appears in logs.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> RetryOutcome<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return RetryOutcome::Success(value),
                Err(e) => {
                    warn!(label, attempt, max_attempts, "Attempt failed: {e}");
                    if attempt >= max_attempts {
                        error!(label, attempts = attempt, "Retry limit reached, giving up: {e}");
                        return RetryOutcome::Exhausted {
                            attempts: attempt,
                            last_error: e,
                        };
                    }

                    let wait = self.jittered_wait();
                    debug!(label, wait_secs = wait.as_secs_f64(), "Waiting before retry");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
