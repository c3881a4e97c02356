//! Scrape error types.

use orderlens_fetch::TransportError;
use thiserror::Error;

/// Error for a page that could not be read as markup at all.
///
/// Anything short of that is absorbed by the parsers as a missing field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The body was empty or contained no markup.
    #[error("Document is not markup")]
    NotMarkup,
}

/// Error type for order orchestration.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Page transport failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Page could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Not enough session cookies to try a request.
    #[error("Missing session cookies: import them with `orderlens import-curl`")]
    MissingCredentials,

    /// The site answered with its sign-in form.
    #[error("Session expired: the order page shows the sign-in form")]
    SessionExpired,

    /// The order page answered with a non-success status.
    #[error("Order page returned status {0}")]
    Unhealthy(u16),
}

impl ScrapeError {
    /// Returns true if the session cookies are absent or likely expired.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::MissingCredentials | Self::SessionExpired => true,
            Self::Transport(e) => e.is_auth(),
            Self::Parse(_) | Self::Unhealthy(_) => false,
        }
    }
}
