//! Shared setup for commands that talk to the site.

use std::sync::Arc;

use anyhow::{Context, Result};
use orderlens_fetch::{CredentialCarrier, Transport};
use orderlens_scrape::{Endpoints, OrderFetcher};
use orderlens_store::{PersistentCookieStore, Settings};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::Cli;

/// A ready-to-use fetcher plus the Ctrl-C cancellation token.
pub struct Session {
    /// Fetcher over the live transport.
    pub fetcher: OrderFetcher,
    /// Cancelled on the first Ctrl-C.
    pub cancel: CancellationToken,
}

impl Session {
    /// Loads settings and cookies and builds the transport.
    pub async fn open(cli: &Cli) -> Result<Self> {
        let settings = load_settings(cli).await;
        let cookies = Arc::new(open_cookie_store(cli, &settings).await?);
        debug!(
            path = %cookies.path().display(),
            count = cookies.count(),
            "Using cookie file"
        );

        let fetch_settings = settings.to_fetch_settings();
        let endpoints = Endpoints::new(&fetch_settings.base_url)
            .with_context(|| format!("Invalid base URL: {}", fetch_settings.base_url))?;
        let transport = Transport::new(fetch_settings, cookies)?;

        Ok(Self {
            fetcher: OrderFetcher::new(Arc::new(transport), endpoints),
            cancel: cancel_on_ctrl_c(),
        })
    }
}

/// Loads the settings file and applies command-line overrides.
pub async fn load_settings(cli: &Cli) -> Settings {
    let settings = Settings::load_default().await;
    apply_overrides(settings, cli)
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(ms) = cli.rate_limit_ms {
        settings.rate_limit_ms = ms;
    }
    if let Some(retries) = cli.max_retries {
        settings.max_retries = retries;
    }
    settings
}

/// Opens the cookie file selected by `--cookie-file`, `--account`, or the
/// configured default account.
pub async fn open_cookie_store(cli: &Cli, settings: &Settings) -> Result<PersistentCookieStore> {
    if let Some(path) = &cli.cookie_file {
        return Ok(PersistentCookieStore::load(path.clone()).await?);
    }

    let store = match cli.account.as_deref().or(settings.default_account.as_deref()) {
        Some(account) => PersistentCookieStore::load_account(account).await?,
        None => PersistentCookieStore::load_default().await?,
    };
    Ok(store)
}

/// Returns a token cancelled on the first Ctrl-C. A second Ctrl-C exits.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, finishing the current request");
        trigger.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(crate::ExitCode::Interrupted as i32);
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "orderlens",
            "years",
            "--rate-limit-ms",
            "200",
            "--max-retries",
            "0",
        ])
        .unwrap();

        let settings = apply_overrides(Settings::default(), &cli);
        assert_eq!(settings.rate_limit_ms, 200);
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.timeout_secs, Settings::default().timeout_secs);
    }

    #[test]
    fn test_settings_kept_without_flags() {
        let cli = Cli::try_parse_from(["orderlens", "years"]).unwrap();
        let file = Settings {
            rate_limit_ms: 3000,
            ..Settings::default()
        };
        assert_eq!(apply_overrides(file.clone(), &cli), file);
    }

    #[tokio::test]
    async fn test_cookie_file_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let cli = Cli::try_parse_from([
            "orderlens",
            "check",
            "--account",
            "work",
            "--cookie-file",
            path.to_str().unwrap(),
        ])
        .unwrap();

        let store = open_cookie_store(&cli, &Settings::default()).await.unwrap();
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.count(), 0);
    }
}
