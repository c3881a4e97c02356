//! Plain text output formatting.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use orderlens_core::{Order, OrderItem, Transaction};
use orderlens_scrape::ScrapeError;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Item names longer than this are cut with an ellipsis.
const MAX_NAME_CHARS: usize = 60;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------------

    /// Formats a list of orders followed by the amount spent.
    pub fn format_orders(
        &self,
        orders: &[Order],
        transactions: &BTreeMap<String, Vec<Transaction>>,
    ) -> String {
        let mut out = format!("Found {} orders:\n\n", orders.len());

        for order in orders {
            out.push_str(&self.format_order(order));
            out.push('\n');
            if let Some(txs) = transactions.get(&order.id) {
                out.push_str(&self.format_transactions(txs));
                out.push('\n');
            }
            out.push('\n');
        }

        let spent: f64 = orders.iter().map(|o| o.total).sum();
        out.push_str(&format!(
            "Total spent: {} across {} orders",
            self.bold(&money(spent)),
            orders.len()
        ));
        out
    }

    /// Formats one order: header, price breakdown and items.
    pub fn format_order(&self, order: &Order) -> String {
        let mut lines = vec![format!("Order ID: {}", self.bold(&order.id))];

        if let Some(date) = order.date {
            lines.push(format!("  Date:     {}", long_date(date)));
        }
        lines.push(format!("  Total:    {}", money(order.total)));

        if order.subtotal > 0.0 {
            lines.push(format!("  Subtotal: {}", money(order.subtotal)));
        }
        if order.tax > 0.0 {
            lines.push(format!("  Tax:      {}", money(order.tax)));
        }
        if order.shipping_fees > 0.0 {
            lines.push(format!("  Shipping: {}", money(order.shipping_fees)));
        }

        if !order.items.is_empty() {
            lines.push(format!("  Items ({}):", order.items.len()));
            lines.extend(order.items.iter().map(|item| self.format_item(item)));
        } else if order.is_summary_only() {
            lines.push(self.dim("  (summary only)"));
        }

        lines.join("\n")
    }

    fn format_item(&self, item: &OrderItem) -> String {
        let mut line = format!("    - {}", truncate_name(&item.name, MAX_NAME_CHARS));
        if item.unit_price > 0.0 {
            line.push_str(&format!(" ({}", money(item.unit_price)));
            if item.quantity > 1.0 {
                line.push_str(&format!(" x{:.0}", item.quantity));
            }
            line.push(')');
        }
        line
    }

    // ------------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------------

    /// Formats an order's transactions, indented under the order.
    pub fn format_transactions(&self, transactions: &[Transaction]) -> String {
        if transactions.is_empty() {
            return self.dim("  No transactions");
        }

        let mut lines = vec![format!("  Transactions ({}):", transactions.len())];
        for tx in transactions {
            let date = tx.date.map_or_else(|| "unknown date".to_string(), long_date);
            let mut line = format!("    - {date}: {}", money(tx.amount));
            if !tx.payment_method.is_empty() {
                line.push_str(&format!(" via {}", tx.payment_method));
            }
            if !tx.status.is_empty() {
                line.push_str(&format!(" [{}]", self.status(&tx.status)));
            }
            lines.push(line);
        }
        lines.push(format!(
            "    Charged:  {}",
            money(Transaction::total(transactions))
        ));
        lines.join("\n")
    }

    /// Formats one order id with its transactions.
    pub fn format_order_transactions(&self, order_id: &str, transactions: &[Transaction]) -> String {
        format!(
            "Order ID: {}\n{}",
            self.bold(order_id),
            self.format_transactions(transactions)
        )
    }

    // ------------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------------

    /// Formats the list of order years.
    pub fn format_years(&self, years: &[i32]) -> String {
        years
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats a health check result.
    pub fn format_check(&self, error: Option<&ScrapeError>) -> String {
        match error {
            None => format!("{} Session is valid", self.green("✓")),
            Some(e) => format!("{} {e}", self.red("✗")),
        }
    }

    /// Notice printed when Ctrl-C stopped a fetch.
    pub fn format_interrupted(&self, fetched: usize) -> String {
        self.yellow(&format!("Interrupted: showing {fetched} results fetched so far"))
    }

    fn status(&self, status: &str) -> String {
        if status.eq_ignore_ascii_case("completed") {
            self.green(status)
        } else {
            self.yellow(status)
        }
    }

    // ------------------------------------------------------------------------
    // Colors
    // ------------------------------------------------------------------------

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}

/// Formats an amount as `$1234.50`.
pub(super) fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Formats a date as `January 2, 2006`.
pub(super) fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Cuts `name` to `max` characters, ending with `...` when cut.
pub(super) fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
