//! JSON output formatting.

use std::collections::BTreeMap;

use anyhow::Result;
use orderlens_core::{Order, Transaction};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output of the orders command.
#[derive(Debug, Serialize)]
pub struct OrdersOutput<'a> {
    pub count: usize,
    pub total_spent: f64,
    pub cancelled: bool,
    pub orders: &'a [Order],
    #[serde(skip_serializing_if = "no_transactions")]
    pub transactions: &'a BTreeMap<String, Vec<Transaction>>,
}

impl<'a> OrdersOutput<'a> {
    /// Wraps fetched orders with their totals.
    pub fn new(
        orders: &'a [Order],
        transactions: &'a BTreeMap<String, Vec<Transaction>>,
        cancelled: bool,
    ) -> Self {
        Self {
            count: orders.len(),
            total_spent: round_cents(orders.iter().map(|o| o.total).sum()),
            cancelled,
            orders,
            transactions,
        }
    }
}

/// JSON output of the order command.
#[derive(Debug, Serialize)]
pub struct OrderOutput<'a> {
    pub order: &'a Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<&'a [Transaction]>,
}

/// JSON output of the transactions command.
#[derive(Debug, Serialize)]
pub struct TransactionsOutput<'a> {
    pub cancelled: bool,
    pub transactions: &'a BTreeMap<String, Vec<Transaction>>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_transactions(map: &&BTreeMap<String, Vec<Transaction>>) -> bool {
    map.is_empty()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable data.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let output = formatter.format(&vec![2024, 2023]).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format(&vec![2024, 2023]).unwrap();
        assert_eq!(output, "[2024,2023]");
    }

    #[test]
    fn test_round_cents() {
        assert!((round_cents(0.1 + 0.2) - 0.3).abs() < f64::EPSILON);
        assert!((round_cents(42.374_999) - 42.37).abs() < f64::EPSILON);
    }
}
