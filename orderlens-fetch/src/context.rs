//! Fetch settings shared by every transport instance.

use std::time::Duration;

use crate::retry::RetryStrategy;

/// Browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Site root all endpoints are built from.
pub const DEFAULT_BASE_URL: &str = "https://www.amazon.com";

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for page transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Minimum spacing between two consecutive requests.
    pub rate_limit: Duration,
    /// Overall timeout for a single request.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay for linear backoff.
    pub retry_base_delay: Duration,
    /// Pause after a 429 response.
    pub rate_limited_delay: Duration,
    /// Flush the cookie carrier after every successful response.
    pub auto_save: bool,
    /// User agent header value.
    pub user_agent: String,
    /// Site root, e.g. `https://www.amazon.com`.
    pub base_url: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            rate_limit: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            rate_limited_delay: Duration::from_secs(5),
            auto_save: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl FetchSettings {
    /// Sets the minimum spacing between requests.
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets both retry delays.
    pub fn with_retry_delays(mut self, base: Duration, rate_limited: Duration) -> Self {
        self.retry_base_delay = base;
        self.rate_limited_delay = rate_limited;
        self
    }

    /// Enables or disables cookie flushing after each response.
    pub fn with_auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    /// Sets a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Points every endpoint at another site root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds the retry strategy described by these settings.
    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::new(self.max_retries)
            .with_base_delay(self.retry_base_delay)
            .with_rate_limited_delay(self.rate_limited_delay)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.rate_limit, Duration::from_secs(1));
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.max_retries, 3);
        assert!(settings.auto_save);
        assert_eq!(settings.base_url, "https://www.amazon.com");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let settings = FetchSettings::default().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(settings.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_retry_strategy_from_settings() {
        let settings = FetchSettings::default()
            .with_max_retries(1)
            .with_retry_delays(Duration::from_millis(10), Duration::from_millis(50));
        let strategy = settings.retry_strategy();

        assert_eq!(strategy.max_attempts(), 2);
        assert_eq!(strategy.delay_for_attempt(1), Duration::from_millis(10));
        assert_eq!(strategy.rate_limited_delay, Duration::from_millis(50));
    }
}
