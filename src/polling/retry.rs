use std::time::Duration;
use rand::Rng;
use crate::notifier::DeliveryError;

/// Bounded retries of transient delivery failures within one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, attempt: u32, error: &DeliveryError) -> bool {
        error.is_retryable() && attempt < self.max_attempts
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let backoff = self.base_backoff
            .saturating_mul(1 << exp)
            .min(self.max_backoff);
        backoff + jitter(self.base_backoff)
    }
}

fn jitter(base: Duration) -> Duration {
    let max_ms = (base.as_millis() / 4) as u64;
    if max_ms == 0 {
        return Duration::ZERO
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}
