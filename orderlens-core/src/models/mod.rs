//! Domain models for `orderlens`.
//!
//! ## Submodules
//!
//! - [`order`] - Orders, order items and list-page summaries
//! - [`transaction`] - Payment transactions

mod order;
mod transaction;

pub use order::{Order, OrderId, OrderItem, OrderSummary};
pub use transaction::Transaction;
