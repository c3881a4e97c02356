//! CLI command implementations.

pub mod check;
pub mod import;
pub mod order;
pub mod orders;
pub mod session;
pub mod transactions;
pub mod years;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Everything requested was fetched.
    Done,
    /// Ctrl-C stopped the fetch; partial results were printed.
    Interrupted,
}

impl Completion {
    /// Maps a batch's cancellation flag.
    pub fn from_cancelled(cancelled: bool) -> Self {
        if cancelled { Self::Interrupted } else { Self::Done }
    }
}

/// Printed when the session cookies are missing or rejected.
pub const IMPORT_HINT: &str = "\
To import session cookies:
  1. Sign in to Amazon in your browser
  2. Open https://www.amazon.com/your-orders/orders
  3. Open DevTools > Network and refresh the page
  4. Right-click the page request > Copy as cURL
  5. Run: orderlens import-curl \"<paste curl command here>\"";
