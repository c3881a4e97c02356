// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # orderlens Store
//!
//! On-disk state for orderlens.
//!
//! This crate provides:
//!
//! - **PersistentCookieStore**: Session cookies saved as JSON, one file per
//!   account
//! - **Settings**: Transport preferences with persistence
//! - **Persistence**: File I/O helpers and default paths
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use orderlens_store::{PersistentCookieStore, Settings};
//!
//! let settings = Settings::load_default().await;
//! let cookies = Arc::new(PersistentCookieStore::load_default().await?);
//! cookies.import_from_curl(&curl_command).await?;
//! ```

pub mod cookie_store;
pub mod error;
pub mod persistence;
pub mod settings;

pub use cookie_store::{CookieFile, PersistentCookieStore};
pub use error::StoreError;
pub use persistence::{
    cookie_path_for_account, default_config_dir, default_cookie_path, default_settings_path,
    load_json, load_json_or_default, save_json,
};
pub use settings::Settings;
