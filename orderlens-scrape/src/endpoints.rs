//! Site endpoint URLs.

use orderlens_fetch::context::DEFAULT_BASE_URL;
use orderlens_fetch::TransportError;
use url::Url;

const ORDER_LIST_PATH: &str = "/your-orders/orders";
const ORDER_DETAIL_PATH: &str = "/your-orders/order-details";
const TRANSACTIONS_PATH: &str = "/cpe/yourpayments/transactions";

/// Builds the three page URL families from one site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Creates endpoints rooted at `base`, e.g. `https://www.amazon.com`.
    pub fn new(base: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(format!("{base} cannot be a base URL")));
        }
        Ok(Self { base })
    }

    /// Returns the site root without a trailing slash.
    pub fn base(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Order list page with no filter.
    pub fn order_list_root(&self) -> String {
        self.url(ORDER_LIST_PATH).to_string()
    }

    /// Order list page for `year`, starting at `start_index`.
    pub fn order_list(&self, year: i32, start_index: usize) -> String {
        let mut url = self.url(ORDER_LIST_PATH);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeFilter", &format!("year-{year}"));
            if start_index > 0 {
                query.append_pair("startIndex", &start_index.to_string());
            }
        }
        url.to_string()
    }

    /// Detail page for one order.
    pub fn order_detail(&self, order_id: &str) -> String {
        let mut url = self.url(ORDER_DETAIL_PATH);
        url.query_pairs_mut().append_pair("orderID", order_id);
        url.to_string()
    }

    /// Payment transactions page for one order.
    pub fn transactions(&self, order_id: &str) -> String {
        let mut url = self.url(TRANSACTIONS_PATH);
        url.query_pairs_mut().append_pair("transactionTag", order_id);
        url.to_string()
    }

    fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE_URL).expect("Invalid base URL"),
        }
    }
}

/// Resolves a page link against the site root.
///
/// A link that cannot be resolved is returned unchanged.
pub fn absolute_url(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map_or_else(|_| href.to_string(), String::from)
}
