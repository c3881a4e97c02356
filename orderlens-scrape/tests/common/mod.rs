//! In-memory site used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use orderlens_fetch::{Page, PageSource, TransportError};
use orderlens_scrape::Endpoints;
use tokio_util::sync::CancellationToken;

/// What the fake site answers for a URL.
#[derive(Debug, Clone)]
pub enum Reply {
    Html(String),
    Status(u16),
    AuthFailure,
}

/// A [`PageSource`] serving canned pages and recording every request.
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, Reply>,
    requests: Mutex<Vec<String>>,
    logged_out: bool,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// A site whose carrier lacks the essential cookies.
    pub fn without_credentials() -> Self {
        Self {
            logged_out: true,
            ..Self::default()
        }
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Reply::Html(html.into()));
        self
    }

    pub fn reply(mut self, url: impl Into<String>, reply: Reply) -> Self {
        self.pages.insert(url.into(), reply);
        self
    }

    /// Cancels `token` once `count` requests have been served.
    pub fn cancel_after(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FakeSite {
    async fn fetch_page(&self, url: &str) -> Result<Page, TransportError> {
        let served = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(url.to_string());
            requests.len()
        };
        if let Some((count, token)) = &self.cancel_after {
            if served >= *count {
                token.cancel();
            }
        }

        let (status, body) = match self.pages.get(url) {
            Some(Reply::Html(body)) => (200, body.clone()),
            Some(Reply::Status(status)) => (*status, String::new()),
            Some(Reply::AuthFailure) => return Err(TransportError::Authentication { status: 401 }),
            None => (404, String::new()),
        };
        Ok(Page {
            url: url.to_string(),
            status,
            body,
        })
    }

    fn has_essential_credentials(&self) -> bool {
        !self.logged_out
    }
}

// ============================================================================
// Markup builders
// ============================================================================

pub fn endpoints() -> Endpoints {
    Endpoints::default()
}

/// A canonical order id unique per (year, index).
pub fn order_id(year: i32, index: usize) -> String {
    format!("1{:02}-{:07}-{:07}", year % 100, index, 1_000_000 + index)
}

pub fn order_card(id: &str, date: &str, total: &str) -> String {
    format!(
        r#"<div class="order-card">
          <ul>
            <li class="order-header__header-list-item"><span>Order placed</span> <span>{date}</span></li>
            <li class="order-header__header-list-item"><span>Total</span> <span>{total}</span></li>
          </ul>
          <a href="/your-orders/order-details?orderID={id}">View order details</a>
          <div class="item-box"><div class="yohtmlc-product-title">Item of {id}</div></div>
        </div>"#
    )
}

pub fn list_page(cards: &[String]) -> String {
    format!(
        r#"<html><body><div class="your-orders-content-container">{}</div></body></html>"#,
        cards.concat()
    )
}

/// A list page with `count` cards for `year`, numbered from `first`.
pub fn year_page(year: i32, first: usize, count: usize) -> String {
    let cards: Vec<String> = (first..first + count)
        .map(|i| order_card(&order_id(year, i), &format!("March 3, {year}"), "$10.00"))
        .collect();
    list_page(&cards)
}

pub fn detail_page(id: &str, date: Option<&str>, grand_total: &str) -> String {
    let date = date
        .map(|d| format!(r#"<div data-component="orderDate"><span>{d}</span></div>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
          {date}
          <span>Order # <bdi>{id}</bdi></span>
          <div data-component="chargeSummary">
            <div class="od-line-item-row">
              <span class="od-line-item-row-label">Grand Total:</span>
              <span class="od-line-item-row-content">{grand_total}</span>
            </div>
          </div>
        </body></html>"#
    )
}

pub fn transaction_item(method: &str, amount: &str, order_id: Option<&str>) -> String {
    let link = order_id
        .map(|id| {
            format!(
                r#"<div data-pmts-component-id="link" class="a-row"><div class="a-column a-span12">
                   <a class="a-size-base" href="/gp/css/summary/edit.html?orderID={id}">Order #{id}</a>
                   </div></div>"#
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="apx-transactions-line-item-component-container">
          <div data-pmts-component-id="method" class="a-row">
            <div class="a-column a-span9"><span class="a-text-bold">{method}</span></div>
            <div class="a-column a-span3 a-text-right"><span class="a-text-bold">{amount}</span></div>
          </div>
          {link}
          <div data-pmts-component-id="merchant" class="a-row">
            <div class="a-column a-span12"><span class="a-size-base">AMZN Mktp US</span></div>
          </div>
        </div>"#
    )
}

pub fn transactions_page(items: &[String]) -> String {
    format!(
        r#"<html><body>
          <div class="apx-transactions-sleeve-header-container"><span class="a-text-bold">Completed</span></div>
          <div class="apx-transaction-date-container"><span>January 15, 2025</span></div>
          {}
        </body></html>"#,
        items.concat()
    )
}
