// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # orderlens Fetch
//!
//! Page transport for the orderlens workspace.
//!
//! The site exposes no data API, so every record is read out of
//! server-rendered pages fetched with the account's browser session cookies.
//! This crate owns that network side:
//!
//! ## Host APIs
//!
//! - [`host::cookies`] - Session cookie carrier and `curl` command import
//!
//! ## Transport
//!
//! - [`transport::Transport`] - Rate-limited GET with retries and
//!   authentication-failure classification
//! - [`transport::PageSource`] - Trait the scraper drives, so it can run
//!   against a fake in tests
//! - [`context::FetchSettings`] - Timeouts, spacing and retry settings
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orderlens_fetch::{CookieJar, FetchSettings, Transport};
//!
//! let jar = Arc::new(CookieJar::new());
//! let transport = Transport::new(FetchSettings::default(), jar)?;
//! let page = transport.fetch("https://www.amazon.com/your-orders/orders").await?;
//! ```

// Core modules
pub mod context;
pub mod error;
pub mod host;
pub mod retry;
pub mod transport;

// Re-export key types at crate root

// Errors
pub use error::{CookieError, TransportError};

// Host APIs
pub use host::cookies::{
    essential_cookies, extract_from_curl, Cookie, CookieJar, CredentialCarrier,
};

// Transport
pub use context::FetchSettings;
pub use retry::RetryStrategy;
pub use transport::{Page, PageSource, Transport};
