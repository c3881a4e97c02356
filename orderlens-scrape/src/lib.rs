// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # orderlens Scrape
//!
//! Turns server-rendered order pages into [`orderlens_core`] records.
//!
//! ## Extraction
//!
//! The [`parser`] module reads one page at a time:
//!
//! - [`parser::parse_order_list`] - Order cards on a list page
//! - [`parser::parse_order_detail`] - Money breakdown and line items
//! - [`parser::parse_transactions`] - Payment charges, with a fallback pass
//!   for the older page layout
//!
//! Missing fields are soft gaps (zero, empty, or a dropped record). Only a
//! body that is not markup at all is a [`ParseError`].
//!
//! ## Orchestration
//!
//! [`OrderFetcher`] drives a [`orderlens_fetch::PageSource`] across years,
//! list pages, detail pages and transaction pages.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orderlens_scrape::{FetchOptions, OrderFetcher};
//!
//! let fetcher = OrderFetcher::new(Arc::new(transport), endpoints);
//! let orders = fetcher
//!     .fetch_orders(&FetchOptions::for_year(2025).with_details(true), &cancel)
//!     .await?;
//! println!("{} orders", orders.items.len());
//! ```

pub mod endpoints;
pub mod error;
pub mod orders;
pub mod parser;

pub use endpoints::Endpoints;
pub use error::{ParseError, ScrapeError};
pub use orders::{FetchOptions, Fetched, OrderFetcher, PAGE_SIZE};
