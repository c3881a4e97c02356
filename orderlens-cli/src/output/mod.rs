//! Output formatting for CLI.

mod json;
mod text;

pub use json::{JsonFormatter, OrderOutput, OrdersOutput, TransactionsOutput};
pub use text::TextFormatter;
