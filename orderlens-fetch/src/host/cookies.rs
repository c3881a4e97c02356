//! Session cookie carrier and browser `curl` import.
//!
//! The site authenticates page requests with the browser session cookies of
//! a signed-in account. The [`CredentialCarrier`] trait is the narrow
//! interface the transport needs: read the cookies to send, absorb the ones
//! the server sends back, and flush them to durable storage.
//!
//! [`CookieJar`] is the in-memory implementation. Persistent storage lives in
//! `orderlens-store`.
//!
//! ## Security Note
//!
//! Cookie values are session credentials. They are never logged.

use std::collections::BTreeMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CookieError;

// ============================================================================
// Constants
// ============================================================================

/// Domain assigned to imported cookies.
pub const COOKIE_DOMAIN: &str = ".amazon.com";

/// Cookie names that make up an authenticated session.
const ESSENTIAL_COOKIES: &[&str] = &[
    "session-id",
    "session-id-time",
    "session-token",
    "ubid-main",
    "at-main",
    "sess-at-main",
    "sst-main",
    "x-main",
    "lc-main",
    "i18n-prefs",
];

/// How many essential cookies must be present to attempt a request.
const MIN_ESSENTIAL_COOKIES: usize = 4;

/// Returns the essential cookie names.
pub fn essential_cookies() -> &'static [&'static str] {
    ESSENTIAL_COOKIES
}

// ============================================================================
// Cookie
// ============================================================================

/// A browser cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to.
    #[serde(default)]
    pub domain: String,
    /// Path the cookie is valid for.
    #[serde(default)]
    pub path: String,
    /// Expiration time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// Whether the cookie requires HTTPS.
    #[serde(default)]
    pub secure: bool,
    /// Whether the cookie is HTTP-only.
    #[serde(default)]
    pub http_only: bool,
}

impl Cookie {
    /// Creates a session cookie for the site domain.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: COOKIE_DOMAIN.to_string(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Returns true if the cookie is expired.
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|exp| exp < Utc::now())
    }
}

// ============================================================================
// Credential Carrier
// ============================================================================

/// Storage for the session cookies used to authenticate requests.
///
/// Implementations must be safe to share between concurrent fetches.
#[async_trait]
pub trait CredentialCarrier: Send + Sync {
    /// Returns a cookie by name.
    fn get(&self, name: &str) -> Option<Cookie>;

    /// Adds or replaces a cookie.
    fn set(&self, cookie: Cookie);

    /// Returns a snapshot of all cookies keyed by name.
    fn get_all(&self) -> BTreeMap<String, Cookie>;

    /// Writes the cookies to durable storage.
    async fn flush(&self) -> Result<(), CookieError>;

    /// Returns the number of cookies held.
    fn count(&self) -> usize {
        self.get_all().len()
    }

    /// Returns true if enough of the session cookies are present to try an
    /// authenticated request.
    fn has_essential_cookies(&self) -> bool {
        ESSENTIAL_COOKIES
            .iter()
            .filter(|name| self.get(name).is_some())
            .count()
            >= MIN_ESSENTIAL_COOKIES
    }

    /// Builds the `Cookie` request header value.
    fn cookie_header(&self) -> String {
        self.get_all()
            .values()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ============================================================================
// Cookie Jar
// ============================================================================

/// In-memory cookie carrier.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<BTreeMap<String, Cookie>>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a jar holding the given cookies.
    pub fn with_cookies(cookies: impl IntoIterator<Item = Cookie>) -> Self {
        let jar = Self::new();
        for cookie in cookies {
            jar.set(cookie);
        }
        jar
    }

    /// Replaces every cookie in the jar.
    pub fn replace_all(&self, cookies: impl IntoIterator<Item = Cookie>) {
        let mut map = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        map.clear();
        map.extend(cookies.into_iter().map(|c| (c.name.clone(), c)));
    }
}

#[async_trait]
impl CredentialCarrier for CookieJar {
    fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn set(&self, cookie: Cookie) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cookie.name.clone(), cookie);
    }

    fn get_all(&self) -> BTreeMap<String, Cookie> {
        self.cookies.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn flush(&self) -> Result<(), CookieError> {
        Ok(())
    }
}

// ============================================================================
// curl Import
// ============================================================================

/// `-b '...'`: allows double quotes inside the value.
static SINGLE_QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:-b|--cookie)\s+'([^']+)'").expect("Invalid regex")
});

/// `-b "..."`: allows single quotes inside the value.
static DOUBLE_QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:-b|--cookie)\s+"([^"]+)""#).expect("Invalid regex")
});

/// `-b a=1;b=2`: stops at whitespace or a line-continuation backslash.
static UNQUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:-b|--cookie)\s+([^\s\\]+(?:;[^\s\\]+)*)").expect("Invalid regex")
});

/// Extracts cookies from a "Copy as cURL" command string.
///
/// The `-b`/`--cookie` argument is matched single-quoted first, then
/// double-quoted, then unquoted.
pub fn extract_from_curl(curl_cmd: &str) -> Result<Vec<Cookie>, CookieError> {
    let value = [&*SINGLE_QUOTED_RE, &*DOUBLE_QUOTED_RE, &*UNQUOTED_RE]
        .iter()
        .find_map(|re| re.captures(curl_cmd))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(CookieError::NoCookiesInCurl)?;

    let cookies = parse_cookie_string(value);
    debug!(count = cookies.len(), "Extracted cookies from curl command");
    Ok(cookies)
}

/// Parses a `name=value; name=value` header string.
///
/// Pairs without `=` are skipped.
pub fn parse_cookie_string(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| Cookie::new(name.trim(), value.trim()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
