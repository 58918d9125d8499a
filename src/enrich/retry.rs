//! Linear retry for transient lookup failures.
//!
//! The wait before retry `n` is `base_delay * n`, so with the defaults a
//! lookup waits 1s then 2s before giving up after three attempts.

use std::time::Duration;

use tracing::{debug, instrument};

use super::LookupError;

/// Default maximum attempts per lookup, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay unit for the linear backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Decision on whether to retry a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the delay.
    Retry {
        delay: Duration,
        /// Attempt number of the retry (the first retry is attempt 2).
        attempt: u32,
    },

    /// Give up.
    DoNotRetry { reason: String },
}

/// Retry configuration with linearly increasing delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides whether to retry after `attempt` (1-indexed) failed with `error`.
    #[instrument(skip(self, error), fields(max_attempts = self.max_attempts, service = error.service()))]
    pub fn should_retry(&self, error: &LookupError, attempt: u32) -> RetryDecision {
        if !error.is_transient() {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.base_delay.saturating_mul(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );
        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }
}
