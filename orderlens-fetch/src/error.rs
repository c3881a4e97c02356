//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Transport Error
// ============================================================================

/// Error type for page transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be built or the request could not be formed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Every attempt failed with a network error or a 429.
    #[error("Request failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Description of the last failure.
        last_error: String,
    },

    /// The server answered 401 or 403.
    #[error("Authentication failed: cookies may be expired (status {status})")]
    Authentication {
        /// HTTP status returned.
        status: u16,
    },

    /// The server answered with a status the caller cannot use.
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A cookie value could not be sent as a header.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl TransportError {
    /// Returns true if the session cookies were rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns true if a later attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. } | Self::UnexpectedStatus(500..=599))
    }
}

// ============================================================================
// Cookie Error
// ============================================================================

/// Error type for cookie carrier operations.
#[derive(Debug, Error)]
pub enum CookieError {
    /// A `curl` command had no `-b`/`--cookie` argument.
    #[error("No cookies found in curl command")]
    NoCookiesInCurl,

    /// Cookies could not be written to durable storage.
    #[error("Failed to persist cookies: {0}")]
    Persist(String),
}
