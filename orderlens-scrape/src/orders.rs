//! Order fetch orchestration.
//!
//! [`OrderFetcher`] walks the site on behalf of a caller:
//!
//! 1. pick the years to visit from the [`FetchOptions`]
//! 2. page through each year's order list, ten cards at a time
//! 3. keep summaries inside the requested date range
//! 4. optionally replace each summary with its detail page
//!
//! Single-order failures degrade to what is already known. A failing list
//! page ends that year only. Cancellation is checked before every year,
//! every detail fetch and every transaction fetch; whatever was gathered so
//! far is returned with [`Fetched::cancelled`] set.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use orderlens_core::{Order, OrderSummary, Transaction};
use orderlens_fetch::PageSource;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::endpoints::Endpoints;
use crate::error::ScrapeError;
use crate::parser::{
    looks_like_login_page, parse_order_detail, parse_order_list_with_base, parse_order_years,
    parse_transactions,
};

/// Orders per list page.
pub const PAGE_SIZE: usize = 10;

/// Years offered when the list page has no year filter.
const FALLBACK_YEAR_COUNT: i32 = 5;

// ============================================================================
// Fetch Options
// ============================================================================

/// Which orders to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Single year to fetch. Takes precedence over the date range.
    pub year: Option<i32>,
    /// Earliest order date to keep (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Latest order date to keep (inclusive).
    pub end_date: Option<NaiveDate>,
    /// Stop after this many orders.
    pub max_orders: Option<usize>,
    /// Fetch the detail page of every order.
    pub include_details: bool,
}

impl FetchOptions {
    /// Options for one calendar year.
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    /// Options for an inclusive date range.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }

    /// Sets the earliest date.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the latest date.
    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Caps the number of orders.
    pub fn with_max_orders(mut self, max: usize) -> Self {
        self.max_orders = Some(max);
        self
    }

    /// Enables detail page fetching.
    pub fn with_details(mut self, enabled: bool) -> Self {
        self.include_details = enabled;
        self
    }

    /// Years to visit, newest first.
    pub fn years(&self, today: NaiveDate) -> Vec<i32> {
        if let Some(year) = self.year {
            return vec![year];
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start.year()..=end.year()).rev().collect(),
            (None, Some(end)) => vec![end.year()],
            _ => vec![today.year()],
        }
    }

    /// Returns true if an order dated `date` is inside the range.
    ///
    /// Orders without a readable date are always kept.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return true;
        };
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }

    fn limit_reached(&self, count: usize) -> bool {
        self.max_orders.is_some_and(|max| count >= max)
    }
}

// ============================================================================
// Fetched
// ============================================================================

/// Result of a batch fetch that may have been cancelled part way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched<T> {
    /// Everything gathered before the batch ended.
    pub items: T,
    /// True if the batch stopped because of cancellation.
    pub cancelled: bool,
}

impl<T> Fetched<T> {
    fn complete(items: T) -> Self {
        Self {
            items,
            cancelled: false,
        }
    }

    fn cancelled(items: T) -> Self {
        Self {
            items,
            cancelled: true,
        }
    }

    /// Converts the gathered items, keeping the cancellation flag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            items: f(self.items),
            cancelled: self.cancelled,
        }
    }
}

// ============================================================================
// Order Fetcher
// ============================================================================

/// Drives a [`PageSource`] across list, detail and transaction pages.
pub struct OrderFetcher {
    source: Arc<dyn PageSource>,
    endpoints: Endpoints,
}

impl std::fmt::Debug for OrderFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderFetcher")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl OrderFetcher {
    /// Creates a fetcher over `source`.
    pub fn new(source: Arc<dyn PageSource>, endpoints: Endpoints) -> Self {
        Self { source, endpoints }
    }

    /// Returns the endpoints in use.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ------------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------------

    /// Fetches orders matching `options`.
    ///
    /// Without `include_details` every order is a summary-only projection.
    /// With it, an order whose detail page fails is also summary-only.
    pub async fn fetch_orders(
        &self,
        options: &FetchOptions,
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<Order>>, ScrapeError> {
        let summaries = self.fetch_summaries(options, cancel).await?;
        info!(count = summaries.items.len(), "Fetched order summaries");

        if summaries.cancelled || !options.include_details {
            return Ok(summaries.map(|s| s.iter().map(OrderSummary::to_order).collect()));
        }

        let mut orders = Vec::with_capacity(summaries.items.len());
        let mut degraded = 0usize;

        for summary in &summaries.items {
            if cancel.is_cancelled() {
                info!(fetched = orders.len(), "Order detail fetch cancelled");
                return Ok(Fetched::cancelled(orders));
            }

            debug!(order_id = %summary.id, "Fetching order details");
            match self.fetch_detail(&summary.id).await {
                Ok(mut order) => {
                    if order.date.is_none() {
                        order.date = summary.date;
                    }
                    orders.push(order);
                }
                Err(e) => {
                    warn!(order_id = %summary.id, error = %e, "Failed to fetch order details");
                    degraded += 1;
                    orders.push(summary.to_order());
                }
            }
        }

        info!(
            succeeded = orders.len() - degraded,
            degraded, "Fetched order details"
        );
        Ok(Fetched::complete(orders))
    }

    /// Fetches the order summaries matching `options`.
    pub async fn fetch_summaries(
        &self,
        options: &FetchOptions,
        cancel: &CancellationToken,
    ) -> Result<Fetched<Vec<OrderSummary>>, ScrapeError> {
        self.ensure_credentials()?;

        let today = Local::now().date_naive();
        let mut summaries = Vec::new();
        let mut auth_failure = None;

        for year in options.years(today) {
            if cancel.is_cancelled() {
                info!(fetched = summaries.len(), "Order list fetch cancelled");
                return Ok(Fetched::cancelled(summaries));
            }

            let mut year_summaries = Vec::new();
            if let Err(e) = self.fetch_year(year, options, &mut year_summaries).await {
                warn!(year, error = %e, "Failed to fetch orders for year");
                if e.is_auth() {
                    auth_failure = Some(e);
                }
            }

            summaries.extend(
                year_summaries
                    .into_iter()
                    .filter(|s| options.contains(s.date)),
            );

            if let Some(max) = options.max_orders {
                if summaries.len() >= max {
                    summaries.truncate(max);
                    break;
                }
            }
        }

        match auth_failure {
            Some(e) if summaries.is_empty() => Err(e),
            _ => Ok(Fetched::complete(summaries)),
        }
    }

    /// Pages through one year's order list into `out`.
    ///
    /// Pages fetched before an error stay in `out`.
    #[instrument(skip(self, options, out))]
    async fn fetch_year(
        &self,
        year: i32,
        options: &FetchOptions,
        out: &mut Vec<OrderSummary>,
    ) -> Result<(), ScrapeError> {
        let mut start_index = 0;

        loop {
            let url = self.endpoints.order_list(year, start_index);
            debug!(start_index, url = %url, "Fetching order list page");

            let body = self.get(&url).await?;
            let page = parse_order_list_with_base(&body, self.endpoints.base())?;
            let page_len = page.len();
            out.extend(page);

            if page_len == 0 || options.limit_reached(out.len()) || page_len < PAGE_SIZE {
                break;
            }
            start_index += PAGE_SIZE;
        }

        debug!(count = out.len(), "Fetched year");
        Ok(())
    }

    /// Fetches one order's detail page.
    pub async fn fetch_order(&self, order_id: &str) -> Result<Order, ScrapeError> {
        self.ensure_credentials()?;
        self.fetch_detail(order_id).await
    }

    async fn fetch_detail(&self, order_id: &str) -> Result<Order, ScrapeError> {
        let body = self.get(&self.endpoints.order_detail(order_id)).await?;
        let mut order = parse_order_detail(&body)?;
        if order.id.is_empty() {
            order.id = order_id.to_string();
        }
        Ok(order)
    }

    /// Reads the years the account has orders for, newest first.
    ///
    /// Falls back to the last five calendar years when the page offers no
    /// year filter.
    pub async fn order_years(&self) -> Result<Vec<i32>, ScrapeError> {
        self.ensure_credentials()?;

        let body = self.get(&self.endpoints.order_list_root()).await?;
        let years = parse_order_years(&body)?;
        if !years.is_empty() {
            return Ok(years);
        }

        let current = Local::now().year();
        debug!("No year filter on order page, using recent years");
        Ok((current - FALLBACK_YEAR_COUNT + 1..=current).rev().collect())
    }

    // ------------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------------

    /// Fetches the payment transactions of one order.
    ///
    /// Records without an order id get `order_id`.
    pub async fn fetch_transactions(&self, order_id: &str) -> Result<Vec<Transaction>, ScrapeError> {
        self.ensure_credentials()?;

        let body = self.get(&self.endpoints.transactions(order_id)).await?;
        let mut transactions = parse_transactions(&body)?;
        for tx in transactions.iter_mut().filter(|tx| tx.order_id.is_empty()) {
            tx.order_id = order_id.to_string();
        }

        debug!(order_id, count = transactions.len(), "Parsed transactions");
        Ok(transactions)
    }

    /// Fetches an order and its transactions.
    ///
    /// A failed transaction fetch yields an empty transaction list.
    pub async fn fetch_order_with_transactions(
        &self,
        order_id: &str,
    ) -> Result<(Order, Vec<Transaction>), ScrapeError> {
        let order = self.fetch_order(order_id).await?;
        let transactions = match self.fetch_transactions(order_id).await {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(order_id, error = %e, "Failed to fetch transactions");
                Vec::new()
            }
        };
        Ok((order, transactions))
    }

    /// Fetches transactions for several orders, skipping failures.
    pub async fn fetch_all_transactions(
        &self,
        order_ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<Fetched<BTreeMap<String, Vec<Transaction>>>, ScrapeError> {
        self.ensure_credentials()?;

        let mut result = BTreeMap::new();
        let mut failed = 0usize;

        for order_id in order_ids {
            if cancel.is_cancelled() {
                info!(fetched = result.len(), "Transaction fetch cancelled");
                return Ok(Fetched::cancelled(result));
            }

            match self.fetch_transactions(order_id).await {
                Ok(transactions) => {
                    result.insert(order_id.clone(), transactions);
                }
                Err(e) => {
                    warn!(order_id = %order_id, error = %e, "Failed to fetch transactions for order");
                    failed += 1;
                }
            }
        }

        info!(succeeded = result.len(), failed, "Fetched transactions");
        Ok(Fetched::complete(result))
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    /// Checks that the session cookies still open the order page.
    pub async fn health_check(&self) -> Result<(), ScrapeError> {
        self.ensure_credentials()?;

        let page = self.source.fetch_page(&self.endpoints.order_list_root()).await?;
        if page.status != 200 {
            return Err(ScrapeError::Unhealthy(page.status));
        }
        if looks_like_login_page(&page.body) {
            return Err(ScrapeError::SessionExpired);
        }
        Ok(())
    }

    fn ensure_credentials(&self) -> Result<(), ScrapeError> {
        if self.source.has_essential_credentials() {
            Ok(())
        } else {
            Err(ScrapeError::MissingCredentials)
        }
    }

    async fn get(&self, url: &str) -> Result<String, ScrapeError> {
        let page = self.source.fetch_page(url).await?.ensure_success()?;
        Ok(page.body)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_years_explicit_year_wins() {
        let options = FetchOptions::for_year(2021).with_start_date(date(2019, 1, 1));
        assert_eq!(options.years(date(2025, 6, 1)), vec![2021]);
    }

    #[test]
    fn test_years_range_descending() {
        let options = FetchOptions::between(date(2022, 3, 1), date(2024, 2, 1));
        assert_eq!(options.years(date(2025, 6, 1)), vec![2024, 2023, 2022]);
    }

    #[test]
    fn test_years_end_only_and_default() {
        let options = FetchOptions::default().with_end_date(date(2023, 5, 5));
        assert_eq!(options.years(date(2025, 6, 1)), vec![2023]);

        let options = FetchOptions::default().with_start_date(date(2020, 1, 1));
        assert_eq!(options.years(date(2025, 6, 1)), vec![2025]);

        assert_eq!(FetchOptions::default().years(date(2025, 6, 1)), vec![2025]);
    }

    #[test]
    fn test_contains_is_inclusive_and_keeps_unknown() {
        let options = FetchOptions::between(date(2024, 1, 1), date(2024, 12, 31));
        assert!(options.contains(Some(date(2024, 1, 1))));
        assert!(options.contains(Some(date(2024, 12, 31))));
        assert!(!options.contains(Some(date(2023, 12, 31))));
        assert!(!options.contains(Some(date(2025, 1, 1))));
        assert!(options.contains(None));
        assert!(FetchOptions::default().contains(Some(date(1999, 1, 1))));
    }

    #[test]
    fn test_limit_reached() {
        assert!(!FetchOptions::default().limit_reached(1000));
        let options = FetchOptions::default().with_max_orders(5);
        assert!(!options.limit_reached(4));
        assert!(options.limit_reached(5));
    }

    #[test]
    fn test_fetched_map_keeps_flag() {
        let fetched = Fetched::cancelled(vec![1, 2]).map(|v| v.len());
        assert_eq!(fetched.items, 2);
        assert!(fetched.cancelled);
    }
}
