//! Order list page parser.

use std::collections::BTreeSet;

use orderlens_core::OrderSummary;
use orderlens_fetch::context::DEFAULT_BASE_URL;
use scraper::ElementRef;
use tracing::debug;

use super::text::{
    contains_month, order_id_from_text, order_id_from_url, parse_price, parse_quantity,
    parse_site_date,
};
use super::{document, element_text, first_text, selector};
use crate::endpoints::absolute_url;
use crate::error::ParseError;

/// Parses the order cards of a list page, resolving links against the
/// default site root.
pub fn parse_order_list(body: &str) -> Result<Vec<OrderSummary>, ParseError> {
    parse_order_list_with_base(body, DEFAULT_BASE_URL)
}

/// Parses the order cards of a list page.
///
/// Cards without a readable order id are skipped.
pub fn parse_order_list_with_base(body: &str, base: &str) -> Result<Vec<OrderSummary>, ParseError> {
    let doc = document(body)?;

    let mut summaries = Vec::new();
    for (index, card) in doc.select(selector!(".order-card")).enumerate() {
        match parse_card(card, base) {
            Some(summary) => summaries.push(summary),
            None => debug!(index, "Skipping order card without an order id"),
        }
    }

    debug!(count = summaries.len(), "Parsed order list");
    Ok(summaries)
}

fn parse_card(card: ElementRef<'_>, base: &str) -> Option<OrderSummary> {
    let detail_href = card
        .select(selector!("a[href*='order-details']"))
        .next()
        .and_then(|link| link.value().attr("href"));

    let id = detail_href.and_then(order_id_from_url).or_else(|| {
        let text = first_text(card, selector!(".yohtmlc-order-id"));
        order_id_from_text(&text)
    })?;

    let mut summary = OrderSummary::new(id);
    summary.detail_url = detail_href.map(|href| absolute_url(base, href));

    let header: Vec<String> = card
        .select(selector!(".order-header__header-list-item"))
        .map(element_text)
        .collect();

    summary.date = header
        .iter()
        .filter(|text| contains_month(text))
        .find_map(|text| parse_site_date(text));

    summary.total = header
        .iter()
        .filter(|text| text.to_lowercase().contains("total") || text.starts_with('$'))
        .map(|text| parse_price(text))
        .find(|price| *price > 0.0)
        .unwrap_or(0.0);

    for item in card.select(selector!(".item-box")) {
        summary.item_count = summary.item_count.saturating_add(1);
        let mut title = first_text(item, selector!(".yohtmlc-product-title"));
        if title.is_empty() {
            title = first_text(item, selector!("a[href*='/dp/']"));
        }
        if !title.is_empty() {
            summary.item_names.push(title);
        }
    }

    for marker in card.select(selector!(".product-image__qty")) {
        summary.item_count = summary
            .item_count
            .saturating_add(extra_units(parse_quantity(&element_text(marker))));
    }

    Some(summary)
}

/// Units beyond the first one a quantity badge stands for.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn extra_units(quantity: f64) -> u32 {
    if quantity > 1.0 {
        (quantity as u32).saturating_sub(1)
    } else {
        0
    }
}

/// Reads the years offered by the order list's time filter, newest first.
pub fn parse_order_years(body: &str) -> Result<Vec<i32>, ParseError> {
    let doc = document(body)?;

    let years: BTreeSet<i32> = doc
        .select(selector!("option[value^='year-']"))
        .filter_map(|option| option.value().attr("value"))
        .filter_map(|value| value.strip_prefix("year-"))
        .filter_map(|year| year.trim().parse().ok())
        .collect();

    Ok(years.into_iter().rev().collect())
}

// ============================================================================
// Tests
// ============================================================================
