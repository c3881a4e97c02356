//! Rate-limited, cookie-authenticated page transport.
//!
//! [`Transport`] issues one GET at a time on behalf of the scraper:
//!
//! - consecutive requests are spaced at least `rate_limit` apart
//! - a browser-like header set plus the carrier's `Cookie` header is sent
//! - network failures and 429 answers are retried
//! - 401/403 answers are reported as [`TransportError::Authentication`]
//! - `Set-Cookie` headers on success are merged back into the carrier
//!
//! Any other status is handed back in [`Page::status`]; callers that need a
//! 2xx use [`Page::ensure_success`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::context::FetchSettings;
use crate::error::TransportError;
use crate::host::cookies::{Cookie, CredentialCarrier, COOKIE_DOMAIN};
use crate::retry::RetryStrategy;

// ============================================================================
// Page
// ============================================================================

/// A fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// URL that was requested.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl Page {
    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Converts a non-2xx page into [`TransportError::UnexpectedStatus`].
    pub fn ensure_success(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::UnexpectedStatus(self.status))
        }
    }
}

// ============================================================================
// Page Source
// ============================================================================

/// Anything that can hand the scraper a page by URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches one page.
    async fn fetch_page(&self, url: &str) -> Result<Page, TransportError>;

    /// Returns true if enough session credentials are present to try.
    fn has_essential_credentials(&self) -> bool;
}

// ============================================================================
// Transport
// ============================================================================

enum Attempt {
    Done(Page),
    RateLimited,
    Retry(String),
}

/// HTTP page transport.
pub struct Transport {
    client: Client,
    carrier: Arc<dyn CredentialCarrier>,
    settings: FetchSettings,
    retry: RetryStrategy,
    last_request: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("settings", &self.settings)
            .field("cookies", &self.carrier.count())
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Creates a transport that authenticates with `carrier`.
    pub fn new(
        settings: FetchSettings,
        carrier: Arc<dyn CredentialCarrier>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .default_headers(browser_headers())
            .build()?;

        Ok(Self {
            client,
            carrier,
            retry: settings.retry_strategy(),
            settings,
            last_request: Mutex::new(None),
        })
    }

    /// Returns the settings this transport was built with.
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Returns the credential carrier.
    pub fn carrier(&self) -> &Arc<dyn CredentialCarrier> {
        &self.carrier
    }

    /// Fetches a page, retrying network failures and 429 answers.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<Page, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let attempts = self.retry.max_attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            self.wait_for_slot().await;

            let (reason, delay) = match self.attempt(&parsed).await? {
                Attempt::Done(page) => return Ok(page),
                Attempt::RateLimited => {
                    (RATE_LIMITED.to_string(), self.retry.rate_limited_delay)
                }
                Attempt::Retry(reason) => (reason, self.retry.delay_for_attempt(attempt)),
            };

            warn!(attempt, max_attempts = attempts, error = %reason, "Request failed");
            if attempt < attempts {
                sleep(delay).await;
            }
            last_error = reason;
        }

        Err(TransportError::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    async fn attempt(&self, url: &Url) -> Result<Attempt, TransportError> {
        let mut request = self.client.get(url.clone());
        let cookies = self.carrier.cookie_header();
        if !cookies.is_empty() {
            let value = HeaderValue::from_str(&cookies)
                .map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
            request = request.header(header::COOKIE, value);
        }

        debug!("GET request");
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if self.retry.should_retry(&e) => return Ok(Attempt::Retry(e.to_string())),
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        debug!(status = %status, "Response received");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(TransportError::Authentication {
                    status: status.as_u16(),
                });
            }
            StatusCode::TOO_MANY_REQUESTS => return Ok(Attempt::RateLimited),
            _ => {}
        }

        let received = response_cookies(&response);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Ok(Attempt::Retry(e.to_string())),
        };

        if status.is_success() {
            self.absorb_cookies(received).await;
        }

        debug!(len = body.len(), "Body read");
        Ok(Attempt::Done(Page {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        }))
    }

    /// Waits until `rate_limit` has passed since the previous dispatch.
    ///
    /// The lock is held across the wait so concurrent callers queue up.
    async fn wait_for_slot(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.settings.rate_limit;
            if ready_at > Instant::now() {
                debug!("Waiting for rate limit");
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn absorb_cookies(&self, cookies: Vec<Cookie>) {
        if cookies.is_empty() {
            return;
        }
        debug!(count = cookies.len(), "Merging response cookies");
        for cookie in cookies {
            self.carrier.set(cookie);
        }
        if self.settings.auto_save {
            if let Err(e) = self.carrier.flush().await {
                warn!(error = %e, "Failed to save cookies");
            }
        }
    }
}

#[async_trait]
impl PageSource for Transport {
    async fn fetch_page(&self, url: &str) -> Result<Page, TransportError> {
        self.fetch(url).await
    }

    fn has_essential_credentials(&self) -> bool {
        self.carrier.has_essential_cookies()
    }
}

// ============================================================================
// Helpers
// ============================================================================

const RATE_LIMITED: &str = "rate limited (429)";

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers
}

fn response_cookies(response: &Response) -> Vec<Cookie> {
    response
        .cookies()
        .map(|c| Cookie {
            name: c.name().to_string(),
            value: c.value().to_string(),
            domain: c.domain().unwrap_or(COOKIE_DOMAIN).to_string(),
            path: c.path().unwrap_or("/").to_string(),
            expires: c.expires().map(DateTime::<Utc>::from),
            secure: c.secure(),
            http_only: c.http_only(),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
