use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Losses tolerated before backing off for `long_pause`.
    pub max_attempts_before_long_pause: u32,
    pub long_pause: Duration,
    pub max_exponent: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts_before_long_pause: 10,
            long_pause: Duration::from_secs(60),
            max_exponent: 5,
        }
    }
}

impl RetryPolicy {
    /// Delay before reconnect attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(self.max_exponent).min(31);
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    pub fn reaches_long_pause(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts_before_long_pause
    }
}
