//! Order types.
//!
//! This module contains the order records read from the site:
//! - [`OrderSummary`] - One order card from the order list
//! - [`Order`] - Full order with money breakdown and items
//! - [`OrderItem`] - One product line of an order
//! - [`OrderId`] - Validated caller-supplied order identifier

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Order Id
// ============================================================================

/// An order identifier in canonical `NNN-NNNNNNN-NNNNNNN` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Validates and wraps an order id.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let text = text.trim();
        if Self::is_canonical(text) {
            Ok(Self(text.to_string()))
        } else {
            Err(CoreError::InvalidOrderId(text.to_string()))
        }
    }

    /// Returns true if `text` is exactly `NNN-NNNNNNN-NNNNNNN`.
    pub fn is_canonical(text: &str) -> bool {
        let groups: Vec<&str> = text.split('-').collect();
        groups.len() == 3
            && [3, 7, 7]
                .iter()
                .zip(&groups)
                .all(|(len, g)| g.len() == *len && g.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Order Summary
// ============================================================================

/// Basic order information from one card of the order list page.
///
/// Summaries are never modified after extraction. They either drive a
/// detail-page fetch or are projected straight into an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Order identifier.
    pub id: String,
    /// Order date. `None` when the card did not show a readable date.
    pub date: Option<NaiveDate>,
    /// Order total as shown on the card.
    pub total: f64,
    /// Number of units on the card, counting quantity badges.
    pub item_count: u32,
    /// Display names of the products on the card.
    #[serde(default)]
    pub item_names: Vec<String>,
    /// Absolute URL of the order detail page, when the card links to one.
    pub detail_url: Option<String>,
}

impl OrderSummary {
    /// Creates an empty summary for the given order id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            total: 0.0,
            item_count: 0,
            item_names: Vec::new(),
            detail_url: None,
        }
    }

    /// Projects this summary into a summary-only [`Order`].
    pub fn to_order(&self) -> Order {
        Order::from_summary(self)
    }
}

// ============================================================================
// Order
// ============================================================================

/// A retail order.
///
/// Orders built from a list-page summary only carry id, date and total; the
/// other money fields stay zero and `items` stays empty. Callers can tell the
/// two apart with [`Order::is_summary_only`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: String,
    /// Order date.
    pub date: Option<NaiveDate>,
    /// Grand total.
    #[serde(default)]
    pub total: f64,
    /// Item subtotal before tax and fees.
    #[serde(default)]
    pub subtotal: f64,
    /// Tax amount.
    #[serde(default)]
    pub tax: f64,
    /// Shipping and handling fees.
    #[serde(default)]
    pub shipping_fees: f64,
    /// Items in page order.
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Creates an empty order with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            total: 0.0,
            subtotal: 0.0,
            tax: 0.0,
            shipping_fees: 0.0,
            items: Vec::new(),
        }
    }

    /// Builds a summary-only order: id, date and total, nothing else.
    pub fn from_summary(summary: &OrderSummary) -> Self {
        Self {
            date: summary.date,
            total: summary.total,
            ..Self::new(summary.id.clone())
        }
    }

    /// Returns true if this order carries no detail-page data.
    pub fn is_summary_only(&self) -> bool {
        self.subtotal == 0.0 && self.tax == 0.0 && self.shipping_fees == 0.0 && self.items.is_empty()
    }

    /// Sum of the item line totals.
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|i| i.price).sum()
    }

    /// Total number of units across all items.
    pub fn item_count(&self) -> f64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// ============================================================================
// Order Item
// ============================================================================

/// One product line of an order.
///
/// The unit price is authoritative; `price` is always derived as
/// `unit_price * quantity`. Use [`OrderItem::set_unit_price`] and
/// [`OrderItem::set_quantity`] to keep the two in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Display name.
    pub name: String,
    /// Line total.
    pub price: f64,
    /// Quantity. Fractional for weight-based listings.
    pub quantity: f64,
    /// Price of one unit.
    pub unit_price: f64,
    /// 10-character alphanumeric product identifier.
    pub product_id: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl OrderItem {
    /// Creates an item with quantity 1 and no price yet.
    pub fn new(product_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: 0.0,
            quantity: 1.0,
            unit_price: 0.0,
            product_id: product_id.into(),
            description: None,
            category: None,
        }
    }

    /// Sets the unit price and recomputes the line total.
    pub fn set_unit_price(&mut self, unit_price: f64) {
        self.unit_price = unit_price;
        self.price = self.unit_price * self.quantity;
    }

    /// Sets the quantity and recomputes the line total.
    ///
    /// Non-positive quantities are ignored.
    pub fn set_quantity(&mut self, quantity: f64) {
        if quantity > 0.0 {
            self.quantity = quantity;
            self.price = self.unit_price * self.quantity;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
