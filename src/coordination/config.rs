//! Coordination configuration.

use std::time::Duration;

/// Retry policy for infrastructure failures.
///
/// Only retryable errors (storage faults, timeouts, version conflicts) are
/// retried; the gated operation reloads state on every attempt, so a retry
/// is a full reload-validate-apply cycle, never a partial reapply.
#[derive(Clone, Copy, Debug)]
pub struct CoordinationConfig {
    /// Additional attempts after the first failure.
    pub max_retries: u32,

    /// Base backoff between attempts; doubled each retry.
    pub retry_backoff: Duration,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl CoordinationConfig {
    /// Backoff before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}
