//! Text helpers shared by the page parsers.
//!
//! Everything here is total: unparsable input yields a default (`0.0`, `1.0`,
//! `None`, an empty string) rather than an error.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

// ============================================================================
// Patterns
// ============================================================================

static ORDER_ID_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"orderID=(\d{3}-\d{7}-\d{7})").expect("Invalid regex"));

static ORDER_ID_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3}-\d{7}-\d{7})").expect("Invalid regex"));

static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:/dp/|asin=)([A-Z0-9]{10})").expect("Invalid regex"));

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").expect("Invalid regex"));

static LAST_FOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{4}(\d{4})").expect("Invalid regex"));

/// Tried in order against lowercased text.
static QUANTITY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"qty[:\s]*(\d+)", r"x(\d+)", r"(\d+)x", r"^(\d+)$"]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex"))
        .collect()
});

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "oct", "nov", "dec",
];

const DATE_PREFIXES: &[&str] = &["Ordered on", "Ordered", "Order placed", "Placed on"];

/// Date layouts in priority order.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

// ============================================================================
// Text
// ============================================================================

/// Collapses runs of whitespace to single spaces and trims.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Money and Quantity
// ============================================================================

/// Parses a price such as `$1,234.56` or `USD 42.37`.
///
/// Returns `0.0` when no number is present.
pub fn parse_price(text: &str) -> f64 {
    let cleaned = text.replace(['$', ','], "").replace("USD", "");
    NUMBER_RE
        .captures(cleaned.trim())
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}

/// Parses a quantity such as `Qty: 2`, `x5` or `3x`.
///
/// Returns `1.0` when no positive quantity is present.
pub fn parse_quantity(text: &str) -> f64 {
    let lower = text.trim().to_lowercase();
    QUANTITY_RES
        .iter()
        .filter_map(|re| re.captures(&lower))
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .find(|q| *q > 0.0)
        .unwrap_or(1.0)
}

// ============================================================================
// Dates
// ============================================================================

/// Returns true if the text mentions a month name or abbreviation.
pub fn contains_month(text: &str) -> bool {
    let lower = text.to_lowercase();
    MONTHS.iter().any(|month| lower.contains(month))
}

/// Parses a date as the site renders it, e.g. `Order placed November 26, 2025`.
pub fn parse_site_date(text: &str) -> Option<NaiveDate> {
    let mut text = normalize_whitespace(text);
    for prefix in DATE_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim().to_string();
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
}

// ============================================================================
// Identifiers
// ============================================================================

/// Extracts an order id from an `orderID=` query parameter.
pub fn order_id_from_url(url: &str) -> Option<String> {
    ORDER_ID_URL_RE.captures(url).map(|caps| caps[1].to_string())
}

/// Extracts the first order id found in free text.
pub fn order_id_from_text(text: &str) -> Option<String> {
    ORDER_ID_TEXT_RE.captures(text).map(|caps| caps[1].to_string())
}

/// Extracts a product id from a `/dp/` path or an `asin=` parameter.
pub fn product_id_from_url(url: &str) -> Option<String> {
    PRODUCT_ID_RE.captures(url).map(|caps| caps[1].to_string())
}

// ============================================================================
// Payment Methods
// ============================================================================

/// Splits a payment method label into card brand and last four digits.
///
/// `Prime Visa ****1211` yields `("Visa", "1211")`. Labels without a known
/// brand keyword fall back to the text before the asterisks.
pub fn parse_payment_method(method: &str) -> (String, String) {
    let last_four = LAST_FOUR_RE
        .captures(method)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    let lower = method.to_lowercase();
    let card_type = if lower.contains("visa") {
        "Visa".to_string()
    } else if lower.contains("mastercard") || lower.contains("master card") {
        "Mastercard".to_string()
    } else if lower.contains("amex") || lower.contains("american express") {
        "Amex".to_string()
    } else if lower.contains("discover") {
        "Discover".to_string()
    } else if lower.contains("gift card") {
        "Gift Card".to_string()
    } else if lower.contains("debit") {
        "Debit".to_string()
    } else {
        method.split("****").next().unwrap_or_default().trim().to_string()
    };

    (card_type, last_four)
}

// ============================================================================
// Tests
// ============================================================================
