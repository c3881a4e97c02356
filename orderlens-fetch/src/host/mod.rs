//! Host APIs for system interactions.
//!
//! - [`cookies`] - Session cookie storage interface and `curl` import

pub mod cookies;
