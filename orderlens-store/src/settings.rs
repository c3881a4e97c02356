//! User settings.
//!
//! Stored at `<config_dir>/orderlens/settings.json`. Every field has a
//! default, so a partial or missing file still loads.

use std::path::Path;
use std::time::Duration;

use orderlens_fetch::FetchSettings;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

/// Persisted transport preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum spacing between requests, in milliseconds.
    pub rate_limit_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay for linear backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Pause after a 429 answer, in milliseconds.
    pub rate_limited_delay_ms: u64,
    /// Save cookies after every successful response.
    pub auto_save_cookies: bool,
    /// Custom user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Custom site root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Account used when `--account` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_account: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate_limit_ms: 1000,
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            rate_limited_delay_ms: 5000,
            auto_save_cookies: true,
            user_agent: None,
            base_url: None,
            default_account: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults.
    pub async fn load(path: &Path) -> Self {
        load_json_or_default(path).await
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(&default_settings_path()).await
    }

    /// Saves settings to `path`.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await
    }

    /// Builds transport settings from these preferences.
    pub fn to_fetch_settings(&self) -> FetchSettings {
        let mut settings = FetchSettings::default()
            .with_rate_limit(Duration::from_millis(self.rate_limit_ms))
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries)
            .with_retry_delays(
                Duration::from_millis(self.retry_base_delay_ms),
                Duration::from_millis(self.rate_limited_delay_ms),
            )
            .with_auto_save(self.auto_save_cookies);

        if let Some(user_agent) = &self.user_agent {
            settings = settings.with_user_agent(user_agent.clone());
        }
        if let Some(base_url) = &self.base_url {
            settings = settings.with_base_url(base_url.clone());
        }
        settings
    }
}
