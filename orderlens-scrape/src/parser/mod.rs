//! Page parsers.
//!
//! Each parser takes a raw page body and returns a best-effort result. The
//! site ships at least two markup generations for some pages, so parsers run
//! a primary selector pass and, where needed, a fallback pass.

/// Compiles a CSS selector once.
macro_rules! selector {
    ($css:expr) => {{
        static SELECTOR: std::sync::LazyLock<scraper::Selector> = std::sync::LazyLock::new(|| {
            scraper::Selector::parse($css).expect("Invalid selector")
        });
        &*SELECTOR
    }};
}
pub(crate) use selector;

pub mod order_detail;
pub mod order_list;
pub mod text;
pub mod transactions;

use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;

pub use order_detail::parse_order_detail;
pub use order_list::{parse_order_list, parse_order_list_with_base, parse_order_years};
pub use transactions::parse_transactions;

/// Parses a body into a document.
///
/// A body with no tags at all is rejected; everything else is accepted the
/// way a browser would.
pub(crate) fn document(body: &str) -> Result<Html, ParseError> {
    if !body.contains('<') {
        return Err(ParseError::NotMarkup);
    }
    Ok(Html::parse_document(body))
}

/// Whitespace-normalized text of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    text::normalize_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant matching `selector`, or empty.
pub(crate) fn first_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Returns true if the element carries the class.
pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Returns true if the body is the sign-in form rather than an order page.
pub fn looks_like_login_page(body: &str) -> bool {
    (body.contains("ap_email") || body.contains("ap_password")) && !body.contains("order-card")
}
