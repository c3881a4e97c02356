//! Order detail page parser.
//!
//! Item data is spread over regions that do not nest:
//!
//! 1. Product links anywhere on the page give product id to name.
//! 2. Product links inside the shipment sections give the item list, in
//!    document order, one item per product id.
//! 3. Unit price and quantity regions are matched to items by position: the
//!    *i*-th price region belongs to the *i*-th item.
//!
//! Step 3 relies on the page listing prices in the same order as the
//! shipment links. If a layout ever breaks that, prices land on the wrong
//! items without any error.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use orderlens_core::{Order, OrderItem};
use scraper::{ElementRef, Html};
use tracing::debug;

use super::text::{
    order_id_from_text, order_id_from_url, parse_price, parse_quantity, parse_site_date,
    product_id_from_url,
};
use super::{document, element_text, first_text, selector};
use crate::error::ParseError;

/// Product link text this short is an image or icon link, not a title.
const MIN_TITLE_CHARS: usize = 5;

/// Parses an order detail page.
///
/// The id is left empty when the page does not show one; the caller fills
/// it in from the id it requested.
pub fn parse_order_detail(body: &str) -> Result<Order, ParseError> {
    let doc = document(body)?;

    let mut order = Order::new(find_order_id(&doc).unwrap_or_default());
    order.date = find_order_date(&doc);
    parse_charge_summary(&doc, &mut order);
    if order.total == 0.0 {
        order.total = find_grand_total(&doc).unwrap_or(0.0);
    }
    order.items = parse_items(&doc);

    debug!(
        order_id = %order.id,
        items = order.items.len(),
        total = order.total,
        "Parsed order detail"
    );
    Ok(order)
}

fn find_order_id(doc: &Html) -> Option<String> {
    doc.select(selector!("span, bdi"))
        .map(element_text)
        .filter(|text| text.contains("Order #"))
        .find_map(|text| order_id_from_text(&text))
        .or_else(|| {
            doc.select(selector!("a[href*='orderID=']"))
                .filter_map(|link| link.value().attr("href"))
                .find_map(order_id_from_url)
        })
}

fn find_order_date(doc: &Html) -> Option<NaiveDate> {
    doc.select(selector!("[data-component='orderDate']"))
        .map(element_text)
        .find_map(|text| parse_site_date(&text))
        .or_else(|| {
            doc.select(selector!("span"))
                .map(element_text)
                .filter(|text| text.contains("Ordered on") || text.contains("Order placed"))
                .find_map(|text| parse_site_date(&text))
        })
}

// ============================================================================
// Money
// ============================================================================

fn parse_charge_summary(doc: &Html, order: &mut Order) {
    let sections = doc.select(selector!("#od-subtotals, [data-component='chargeSummary']"));
    for row in sections.flat_map(|section| section.select(selector!(".od-line-item-row"))) {
        let label = first_text(row, selector!(".od-line-item-row-label")).to_lowercase();
        let value = parse_price(&first_text(row, selector!(".od-line-item-row-content")));

        if label.contains("item") && label.contains("subtotal") {
            order.subtotal = value;
        } else if label.contains("shipping") || label.contains("handling") {
            order.shipping_fees = value;
        } else if label.contains("tax") {
            order.tax = value;
        } else if label.contains("grand total") {
            order.total = value;
        }
    }
}

/// Reads the price next to a loose "Grand Total" label.
fn find_grand_total(doc: &Html) -> Option<f64> {
    doc.select(selector!("span"))
        .filter(|span| element_text(*span).contains("Grand Total"))
        .filter_map(|span| span.parent().and_then(ElementRef::wrap))
        .filter_map(|parent| parent.next_siblings().find_map(ElementRef::wrap))
        .map(|sibling| parse_price(&element_text(sibling)))
        .find(|price| *price > 0.0)
}

// ============================================================================
// Items
// ============================================================================

fn parse_items(doc: &Html) -> Vec<OrderItem> {
    let mut names: HashMap<String, String> = HashMap::new();
    for link in doc.select(selector!("a[href*='/dp/']")) {
        let Some(product_id) = link.value().attr("href").and_then(product_id_from_url) else {
            continue;
        };
        let text = element_text(link);
        if text.chars().count() > MIN_TITLE_CHARS {
            names.insert(product_id, text);
        }
    }

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    let shipments = doc.select(selector!(
        "[data-component='shipments'], [data-component='shipmentsLeftGrid']"
    ));
    for link in shipments.flat_map(|s| s.select(selector!("a[href*='/dp/']"))) {
        let Some(product_id) = link.value().attr("href").and_then(product_id_from_url) else {
            continue;
        };
        if seen.insert(product_id.clone()) {
            let name = names.get(&product_id).cloned().unwrap_or_default();
            items.push(OrderItem::new(product_id, name));
        }
    }

    for (item, region) in items
        .iter_mut()
        .zip(doc.select(selector!("[data-component='unitPrice']")))
    {
        let mut text = first_text(region, selector!(".a-offscreen"));
        if text.is_empty() {
            text = first_text(region, selector!(".a-price"));
        }
        item.set_unit_price(parse_price(&text));
    }

    for (item, region) in items
        .iter_mut()
        .zip(doc.select(selector!("[data-component='quantity']")))
    {
        item.set_quantity(parse_quantity(&element_text(region)));
    }

    items
}

// ============================================================================
// Tests
// ============================================================================
