// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `orderlens` Core
//!
//! Domain models shared by every `orderlens` crate.
//!
//! Records are produced once by page extraction and then owned by the caller.
//! None of them keep a reference to the page they were read from.
//!
//! ## Key Types
//!
//! ### Orders
//! - [`OrderSummary`] - One order card from an order list page
//! - [`Order`] - A full order, or a summary-only projection of one
//! - [`OrderItem`] - One purchased product line
//!
//! ### Payments
//! - [`Transaction`] - One charge against a payment method

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Orders
    Order,
    OrderId,
    OrderItem,
    OrderSummary,
    // Payments
    Transaction,
};
