//! Cookie store tests across accounts and transports.

use std::sync::Arc;

use orderlens_fetch::{CredentialCarrier, FetchSettings, Transport};
use orderlens_store::{CookieFile, PersistentCookieStore, load_json};
use tempfile::TempDir;

const CURL: &str = "curl 'https://www.amazon.com/your-orders/orders' \
    -b 'session-id=1; session-id-time=2; session-token=3; ubid-main=4; lc-main=en_US'";

#[tokio::test]
async fn test_accounts_do_not_share_cookies() {
    let dir = TempDir::new().unwrap();
    let personal = PersistentCookieStore::new(dir.path().join("cookies.json"));
    let work = PersistentCookieStore::new(dir.path().join("cookies-work.json"));

    personal.import_from_curl(CURL).await.unwrap();

    assert_eq!(personal.count(), 5);
    assert_eq!(work.count(), 0);
    assert!(!dir.path().join("cookies-work.json").exists());
}

#[tokio::test]
async fn test_file_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.json");
    PersistentCookieStore::new(&path).import_from_curl(CURL).await.unwrap();

    let raw: serde_json::Value = load_json(&path).await.unwrap();
    assert!(raw["cookies"].is_array());
    assert!(raw["updated_at"].is_string());

    let file: CookieFile = load_json(&path).await.unwrap();
    let names: Vec<_> = file.cookies.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["lc-main", "session-id", "session-id-time", "session-token", "ubid-main"]);
    assert!(file.cookies.iter().all(|c| c.path == "/"));
}

#[tokio::test]
async fn test_store_drives_transport() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(PersistentCookieStore::new(dir.path().join("cookies.json")));
    store.import_from_curl(CURL).await.unwrap();

    let transport = Transport::new(FetchSettings::default(), store.clone()).unwrap();
    assert!(orderlens_fetch::PageSource::has_essential_credentials(&transport));
    assert_eq!(transport.carrier().count(), 5);
}
