//! Payment transaction types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One charge made against a payment method.
///
/// An order may have several transactions (split shipments, multiple
/// charges). `amount` is always a non-negative magnitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Associated order id, e.g. `114-9733092-9360267`. Empty if unknown.
    pub order_id: String,
    /// Date the charge was made.
    pub date: Option<NaiveDate>,
    /// Amount charged.
    pub amount: f64,
    /// Payment method as shown, e.g. `Prime Visa ****1211`.
    pub payment_method: String,
    /// Card brand derived from the payment method, e.g. `Visa`.
    pub card_type: String,
    /// Last four digits of the card, e.g. `1211`.
    pub last_four: String,
    /// Merchant description, e.g. `AMZN Mktp US`.
    pub merchant: String,
    /// Status label, e.g. `Completed` or `Pending`.
    pub status: String,
}

impl Transaction {
    /// Creates an empty transaction for the given order id.
    pub fn for_order(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            ..Self::default()
        }
    }

    /// Returns true if the record carries enough data to keep.
    pub fn is_meaningful(&self) -> bool {
        self.amount > 0.0 || !self.payment_method.is_empty()
    }

    /// Sums the amounts of a set of transactions.
    pub fn total(transactions: &[Transaction]) -> f64 {
        transactions.iter().map(|t| t.amount).sum()
    }
}
