//! Retry strategies for page requests.

use std::time::Duration;

/// Default number of retries after the first attempt.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Strategy for retrying failed requests.
///
/// Generic failures back off linearly (`base_delay * attempt`). A 429 answer
/// waits the fixed, longer `rate_limited_delay` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay, multiplied by the attempt number.
    pub base_delay: Duration,
    /// Pause after a 429 response.
    pub rate_limited_delay: Duration,
}

impl RetryStrategy {
    /// Creates a new retry strategy.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
            rate_limited_delay: Duration::from_secs(5),
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            rate_limited_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the pause used after a 429.
    pub fn with_rate_limited_delay(mut self, delay: Duration) -> Self {
        self.rate_limited_delay = delay;
        self
    }

    /// Total attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Calculates the delay before retry number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Determines if a request error should be retried.
    ///
    /// Anything that reached the network is retried; errors raised while
    /// building the request are not.
    pub fn should_retry(&self, error: &reqwest::Error) -> bool {
        !error.is_builder()
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}
