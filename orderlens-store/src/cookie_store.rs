//! Session cookies persisted as JSON.
//!
//! The file layout is:
//!
//! ```json
//! {
//!   "cookies": [{"name": "session-id", "value": "...", "domain": ".amazon.com", "path": "/"}],
//!   "updated_at": "2025-11-26T10:00:00Z"
//! }
//! ```
//!
//! Each account gets its own file; see [`crate::persistence`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orderlens_fetch::{extract_from_curl, Cookie, CookieError, CookieJar, CredentialCarrier};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{cookie_path_for_account, default_cookie_path, load_json, save_json};

// ============================================================================
// Cookie File
// ============================================================================

/// On-disk cookie file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieFile {
    /// Saved cookies.
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    /// When the file was last written.
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Persistent Cookie Store
// ============================================================================

/// Cookie carrier backed by a JSON file.
#[derive(Debug)]
pub struct PersistentCookieStore {
    path: PathBuf,
    jar: CookieJar,
}

impl PersistentCookieStore {
    /// Creates an empty store that will save to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            jar: CookieJar::new(),
        }
    }

    /// Loads the store from `path`. A missing file gives an empty store.
    ///
    /// Expired cookies are dropped on load.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);

        let file: CookieFile = match load_json(&store.path).await {
            Ok(file) => file,
            Err(e) if e.is_not_found() => {
                debug!(path = %store.path.display(), "No cookie file yet");
                return Ok(store);
            }
            Err(e) => return Err(e),
        };

        let total = file.cookies.len();
        store
            .jar
            .replace_all(file.cookies.into_iter().filter(|c| !c.is_expired()));
        debug!(
            path = %store.path.display(),
            loaded = store.jar.count(),
            expired = total - store.jar.count(),
            "Loaded cookies"
        );
        Ok(store)
    }

    /// Loads the default account's cookie file.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_cookie_path()).await
    }

    /// Loads a named account's cookie file.
    pub async fn load_account(name: &str) -> Result<Self, StoreError> {
        Self::load(cookie_path_for_account(name)?).await
    }

    /// Returns the file this store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every cookie to the file.
    pub async fn save(&self) -> Result<(), StoreError> {
        let file = CookieFile {
            cookies: self.jar.get_all().into_values().collect(),
            updated_at: Utc::now(),
        };
        save_json(&self.path, &file).await?;
        debug!(path = %self.path.display(), count = file.cookies.len(), "Saved cookies");
        Ok(())
    }

    /// Imports the cookies of a "Copy as cURL" command and saves them.
    ///
    /// Returns the number of cookies imported.
    pub async fn import_from_curl(&self, curl_cmd: &str) -> Result<usize, StoreError> {
        let cookies = extract_from_curl(curl_cmd)?;
        let count = cookies.len();
        for cookie in cookies {
            self.jar.set(cookie);
        }
        self.save().await?;
        info!(count, path = %self.path.display(), "Imported cookies");
        Ok(count)
    }
}

#[async_trait]
impl CredentialCarrier for PersistentCookieStore {
    fn get(&self, name: &str) -> Option<Cookie> {
        self.jar.get(name)
    }

    fn set(&self, cookie: Cookie) {
        self.jar.set(cookie);
    }

    fn get_all(&self) -> BTreeMap<String, Cookie> {
        self.jar.get_all()
    }

    async fn flush(&self) -> Result<(), CookieError> {
        self.save()
            .await
            .map_err(|e| CookieError::Persist(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
