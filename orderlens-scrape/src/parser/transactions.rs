//! Payment transactions page parser.
//!
//! The current layout is a flat run of status headers, date markers and
//! line items. Status and date are carried forward in document order and
//! stamped onto each line item that follows them.
//!
//! An older layout groups charges under "Transactions from Order" headings.
//! It is only tried when the current layout yields nothing.

use chrono::NaiveDate;
use orderlens_core::Transaction;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::text::{
    contains_month, order_id_from_text, order_id_from_url, parse_payment_method, parse_price,
    parse_site_date,
};
use super::{document, element_text, first_text, has_class, selector};
use crate::error::ParseError;

const STATUS_HEADER: &str = "apx-transactions-sleeve-header-container";
const DATE_MARKER: &str = "apx-transaction-date-container";

/// Parses a transactions page.
pub fn parse_transactions(body: &str) -> Result<Vec<Transaction>, ParseError> {
    let doc = document(body)?;

    let transactions = parse_line_items(&doc);
    if !transactions.is_empty() {
        debug!(count = transactions.len(), "Parsed transactions");
        return Ok(transactions);
    }

    let transactions = parse_order_sections(&doc);
    debug!(count = transactions.len(), "Parsed transactions from order sections");
    Ok(transactions)
}

// ============================================================================
// Current Layout
// ============================================================================

fn parse_line_items(doc: &Html) -> Vec<Transaction> {
    let nodes = doc.select(selector!(
        ".apx-transactions-sleeve-header-container, \
         .apx-transaction-date-container, \
         .apx-transactions-line-item-component-container"
    ));

    let mut status = String::new();
    let mut date: Option<NaiveDate> = None;
    let mut transactions = Vec::new();

    for node in nodes {
        if has_class(node, STATUS_HEADER) {
            let text = first_text(node, selector!(".a-text-bold"));
            if !text.is_empty() {
                status = text;
            }
        } else if has_class(node, DATE_MARKER) {
            let mut text = first_text(node, selector!("span"));
            if text.is_empty() {
                text = element_text(node);
            }
            if let Some(parsed) = parse_site_date(&text) {
                date = Some(parsed);
            }
        } else {
            let tx = parse_line_item(node, &status, date);
            if tx.is_meaningful() {
                transactions.push(tx);
            }
        }
    }

    transactions
}

fn parse_line_item(item: ElementRef<'_>, status: &str, date: Option<NaiveDate>) -> Transaction {
    let mut tx = Transaction {
        status: status.to_string(),
        date,
        ..Transaction::default()
    };

    for row in item.select(selector!("[data-pmts-component-id]")) {
        let method = first_text(row, selector!(".a-column.a-span9 .a-text-bold"));
        if !method.is_empty() {
            (tx.card_type, tx.last_four) = parse_payment_method(&method);
            tx.payment_method = method;
        }

        let amount = first_text(row, selector!(".a-column.a-span3 .a-text-bold"));
        if !amount.is_empty() {
            tx.amount = parse_price(amount.trim_start_matches('-'));
        }

        for link in row.select(selector!("a[href*='orderID=']")) {
            if let Some(id) = link.value().attr("href").and_then(order_id_from_url) {
                tx.order_id = id;
                continue;
            }
            let text = element_text(link);
            if tx.order_id.is_empty() && text.contains("Order #") {
                tx.order_id = order_id_from_text(&text).unwrap_or_default();
            }
        }

        let merchant = first_text(row, selector!(".a-column.a-span12 .a-size-base"));
        if !merchant.is_empty() && !merchant.contains("Order #") {
            tx.merchant = merchant;
        }
    }

    tx
}

// ============================================================================
// Order Section Layout
// ============================================================================

fn parse_order_sections(doc: &Html) -> Vec<Transaction> {
    let mut status = String::new();
    let mut date: Option<NaiveDate> = None;
    let mut transactions = Vec::new();

    for heading in doc.select(selector!("h3")) {
        let heading_text = element_text(heading);
        if !heading_text.contains("Transactions from Order") {
            continue;
        }
        let order_id = order_id_from_text(&heading_text).unwrap_or_default();

        let Some(section) = heading
            .parent()
            .and_then(|p| p.parent())
            .and_then(ElementRef::wrap)
        else {
            continue;
        };

        if let Some(title) = section
            .select(selector!(".a-box-title .a-text-bold"))
            .map(element_text)
            .last()
        {
            status = title;
        }

        for span in section.select(selector!("span")) {
            let text = element_text(span);
            if contains_month(&text) && !text.contains("Order") {
                if let Some(parsed) = parse_site_date(&text) {
                    date = Some(parsed);
                }
            }
        }

        for bold in section.select(selector!(".a-text-bold")) {
            let method = element_text(bold);
            if !method.contains("****") {
                continue;
            }

            let amount = bold
                .parent()
                .and_then(ElementRef::wrap)
                .map(|parent| {
                    first_text(parent, selector!(".a-span3 .a-text-bold, .a-text-right .a-text-bold"))
                })
                .map_or(0.0, |text| parse_price(text.trim_start_matches('-')));

            if amount > 0.0 {
                let (card_type, last_four) = parse_payment_method(&method);
                transactions.push(Transaction {
                    order_id: order_id.clone(),
                    date,
                    amount,
                    payment_method: method,
                    card_type,
                    last_four,
                    status: status.clone(),
                    ..Transaction::default()
                });
            }
        }
    }

    transactions
}

// ============================================================================
// Tests
// ============================================================================
