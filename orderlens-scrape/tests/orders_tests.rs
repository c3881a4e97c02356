//! Orchestration tests against an in-memory site.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::*;
use orderlens_core::Transaction;
use orderlens_scrape::{FetchOptions, OrderFetcher, ScrapeError};
use tokio_util::sync::CancellationToken;

fn fetcher(site: &Arc<FakeSite>) -> OrderFetcher {
    OrderFetcher::new(site.clone(), endpoints())
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_pagination_stops_after_short_page() {
    let e = endpoints();
    let site = Arc::new(
        FakeSite::new()
            .page(e.order_list(2024, 0), year_page(2024, 0, 10))
            .page(e.order_list(2024, 10), year_page(2024, 10, 10))
            .page(e.order_list(2024, 20), year_page(2024, 20, 4))
            .page(e.order_list(2024, 30), year_page(2024, 30, 10)),
    );

    let result = fetcher(&site)
        .fetch_summaries(&FetchOptions::for_year(2024), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.items.len(), 24);
    assert!(!result.cancelled);
    assert_eq!(
        site.requests(),
        vec![e.order_list(2024, 0), e.order_list(2024, 10), e.order_list(2024, 20)]
    );
}

#[tokio::test]
async fn test_pagination_stops_on_empty_page() {
    let e = endpoints();
    let site = Arc::new(
        FakeSite::new()
            .page(e.order_list(2024, 0), year_page(2024, 0, 10))
            .page(e.order_list(2024, 10), list_page(&[])),
    );

    let result = fetcher(&site)
        .fetch_summaries(&FetchOptions::for_year(2024), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.items.len(), 10);
    assert_eq!(site.requests().len(), 2);
}

#[tokio::test]
async fn test_max_orders_stops_paging_and_truncates() {
    let e = endpoints();
    let site = Arc::new(
        FakeSite::new()
            .page(e.order_list(2024, 0), year_page(2024, 0, 10))
            .page(e.order_list(2024, 10), year_page(2024, 10, 10))
            .page(e.order_list(2023, 0), year_page(2023, 0, 10)),
    );
    let options = FetchOptions::between(
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
    .with_max_orders(7);

    let result = fetcher(&site)
        .fetch_orders(&options, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.items.len(), 7);
    assert_eq!(site.requests(), vec![e.order_list(2024, 0)]);
    assert!(result.items.iter().all(|o| o.is_summary_only()));
}

// ============================================================================
// Years and filtering
// ============================================================================

#[tokio::test]
async fn test_date_range_visits_years_newest_first_and_filters() {
    let e = endpoints();
    let cards_2024 = vec![
        order_card(&order_id(2024, 1), "December 30, 2024", "$5.00"),
        order_card(&order_id(2024, 2), "February 2, 2024", "$6.00"),
        order_card(&order_id(2024, 3), "sometime", "$7.00"),
    ];
    let cards_2023 = vec![
        order_card(&order_id(2023, 1), "December 1, 2023", "$8.00"),
        order_card(&order_id(2023, 2), "June 1, 2023", "$9.00"),
    ];
    let site = Arc::new(
        FakeSite::new()
            .page(e.order_list(2024, 0), list_page(&cards_2024))
            .page(e.order_list(2023, 0), list_page(&cards_2023)),
    );
    let options = FetchOptions::between(
        NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    );

    let result = fetcher(&site)
        .fetch_summaries(&options, &CancellationToken::new())
        .await
        .unwrap();

    let ids: Vec<_> = result.items.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, vec![order_id(2024, 2), order_id(2024, 3), order_id(2023, 1)]);
    assert!(result.items[1].date.is_none());
    assert_eq!(site.requests(), vec![e.order_list(2024, 0), e.order_list(2023, 0)]);
}

#[tokio::test]
async fn test_failing_year_does_not_stop_other_years() {
    let e = endpoints();
    let site = Arc::new(
        FakeSite::new()
            .reply(e.order_list(2024, 0), Reply::Status(500))
            .page(e.order_list(2023, 0), year_page(2023, 0, 3)),
    );
    let options = FetchOptions::between(
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    );

    let result = fetcher(&site)
        .fetch_summaries(&options, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.items.len(), 3);
}

#[tokio::test]
async fn test_failing_page_keeps_earlier_pages_of_year() {
    let e = endpoints();
    let site = Arc::new(
        FakeSite::new()
            .page(e.order_list(2024, 0), year_page(2024, 0, 10))
            .reply(e.order_list(2024, 10), Reply::Status(503)),
    );

    let result = fetcher(&site)
        .fetch_summaries(&FetchOptions::for_year(2024), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.items.len(), 10);
}

#[tokio::test]
async fn test_auth_failure_with_no_results_is_an_error() {
    let e = endpoints();
    let site = Arc::new(FakeSite::new().reply(e.order_list(2024, 0), Reply::AuthFailure));

    let err = fetcher(&site)
        .fetch_orders(&FetchOptions::for_year(2024), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_auth());
}

#[tokio::test]
async fn test_missing_credentials_blocks_every_fetch() {
    let site = Arc::new(FakeSite::without_credentials());
    let fetcher = fetcher(&site);
    let cancel = CancellationToken::new();

    assert!(matches!(
        fetcher.fetch_orders(&FetchOptions::for_year(2024), &cancel).await,
        Err(ScrapeError::MissingCredentials)
    ));
    assert!(matches!(
        fetcher.fetch_order("114-9733092-9360267").await,
        Err(ScrapeError::MissingCredentials)
    ));
    assert!(matches!(
        fetcher.fetch_transactions("114-9733092-9360267").await,
        Err(ScrapeError::MissingCredentials)
    ));
    assert!(matches!(fetcher.order_years().await, Err(ScrapeError::MissingCredentials)));
    assert!(matches!(fetcher.health_check().await, Err(ScrapeError::MissingCredentials)));
    assert!(site.requests().is_empty());
}

// ============================================================================
// Details
// ============================================================================

#[tokio::test]
async fn test_details_degrade_to_summary_and_backfill_date() {
    let e = endpoints();
    let first = order_id(2025, 1);
    let second = order_id(2025, 2);
    let site = Arc::new(
        FakeSite::new()
            .page(
                e.order_list(2025, 0),
                list_page(&[
                    order_card(&first, "November 26, 2025", "$44.91"),
                    order_card(&second, "November 20, 2025", "$12.00"),
                ]),
            )
            .page(e.order_detail(&first), detail_page(&first, None, "$44.91"))
            .reply(e.order_detail(&second), Reply::Status(500)),
    );

    let result = fetcher(&site)
        .fetch_orders(
            &FetchOptions::for_year(2025).with_details(true),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.items.len(), 2);
    let detailed = &result.items[0];
    assert_eq!(detailed.id, first);
    assert_eq!(detailed.date, NaiveDate::from_ymd_opt(2025, 11, 26));
    assert!((detailed.total - 44.91).abs() < 0.001);

    let degraded = &result.items[1];
    assert_eq!(degraded.id, second);
    assert!(degraded.is_summary_only());
    assert!((degraded.total - 12.0).abs() < 0.001);
    assert_eq!(degraded.date, NaiveDate::from_ymd_opt(2025, 11, 20));
}

#[tokio::test]
async fn test_fetch_order_fills_missing_id() {
    let e = endpoints();
    let id = "113-7382612-3141857";
    let html = r#"<html><body><div class="row">
        <div><span>Grand Total:</span></div><div><span>$42.37</span></div>
    </div></body></html>"#;
    let site = Arc::new(FakeSite::new().page(e.order_detail(id), html));

    let order = fetcher(&site).fetch_order(id).await.unwrap();

    assert_eq!(order.id, id);
    assert!((order.total - 42.37).abs() < 0.001);
}

#[tokio::test]
async fn test_fetch_order_keeps_page_id() {
    let e = endpoints();
    let site = Arc::new(FakeSite::new().page(
        e.order_detail("113-7382612-3141857"),
        detail_page("114-9733092-9360267", Some("Order placed March 1, 2025"), "$1.00"),
    ));

    let order = fetcher(&site).fetch_order("113-7382612-3141857").await.unwrap();
    assert_eq!(order.id, "114-9733092-9360267");
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_transactions_for_split_order() {
    let e = endpoints();
    let id = "112-4559127-2161020";
    let page = transactions_page(&[
        transaction_item("Prime Visa ****1211", "-$52.55", Some(id)),
        transaction_item("Prime Visa ****1211", "-$50.72", Some(id)),
        transaction_item("Prime Visa ****1211", "-$8.03", None),
    ]);
    let site = Arc::new(FakeSite::new().page(e.transactions(id), page));

    let txs = fetcher(&site).fetch_transactions(id).await.unwrap();

    assert_eq!(txs.len(), 3);
    assert!(txs.iter().all(|tx| tx.order_id == id));
    assert!(txs.iter().all(|tx| tx.status == "Completed"));
    assert!((Transaction::total(&txs) - 111.30).abs() < 0.01);
}

#[tokio::test]
async fn test_order_with_failed_transactions() {
    let e = endpoints();
    let id = "114-9733092-9360267";
    let site = Arc::new(
        FakeSite::new()
            .page(e.order_detail(id), detail_page(id, None, "$9.99"))
            .reply(e.transactions(id), Reply::Status(500)),
    );

    let (order, txs) = fetcher(&site).fetch_order_with_transactions(id).await.unwrap();

    assert_eq!(order.id, id);
    assert!(txs.is_empty());
}

#[tokio::test]
async fn test_fetch_all_transactions_skips_failures() {
    let e = endpoints();
    let good = "112-4559127-2161020".to_string();
    let bad = "113-7382612-3141857".to_string();
    let site = Arc::new(
        FakeSite::new()
            .page(
                e.transactions(&good),
                transactions_page(&[transaction_item("Visa ****1211", "-$5.00", None)]),
            )
            .reply(e.transactions(&bad), Reply::AuthFailure),
    );

    let result = fetcher(&site)
        .fetch_all_transactions(&[good.clone(), bad.clone()], &CancellationToken::new())
        .await
        .unwrap();

    assert!(!result.cancelled);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[&good][0].order_id, good);
    assert!(!result.items.contains_key(&bad));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancelled_before_start() {
    let site = Arc::new(FakeSite::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = fetcher(&site)
        .fetch_orders(&FetchOptions::for_year(2024), &cancel)
        .await
        .unwrap();

    assert!(result.cancelled);
    assert!(result.items.is_empty());
    assert!(site.requests().is_empty());
}

#[tokio::test]
async fn test_cancel_during_details_keeps_partial_orders() {
    let e = endpoints();
    let cancel = CancellationToken::new();
    let ids: Vec<String> = (0..3).map(|i| order_id(2025, i)).collect();
    let cards: Vec<String> = ids
        .iter()
        .map(|id| order_card(id, "May 5, 2025", "$3.00"))
        .collect();
    let mut site = FakeSite::new()
        .page(e.order_list(2025, 0), list_page(&cards))
        .cancel_after(2, cancel.clone());
    for id in &ids {
        site = site.page(e.order_detail(id), detail_page(id, None, "$3.00"));
    }
    let site = Arc::new(site);

    let result = fetcher(&site)
        .fetch_orders(&FetchOptions::for_year(2025).with_details(true), &cancel)
        .await
        .unwrap();

    assert!(result.cancelled);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].id, ids[0]);
    assert_eq!(site.requests().len(), 2);
}

#[tokio::test]
async fn test_cancel_during_transactions() {
    let e = endpoints();
    let cancel = CancellationToken::new();
    let ids = vec![order_id(2025, 1), order_id(2025, 2)];
    let site = Arc::new(
        FakeSite::new()
            .page(
                e.transactions(&ids[0]),
                transactions_page(&[transaction_item("Visa ****1211", "-$5.00", None)]),
            )
            .cancel_after(1, cancel.clone()),
    );

    let result = fetcher(&site).fetch_all_transactions(&ids, &cancel).await.unwrap();

    assert!(result.cancelled);
    assert_eq!(result.items.len(), 1);
    assert_eq!(site.requests().len(), 1);
}

// ============================================================================
// Years and health
// ============================================================================

#[tokio::test]
async fn test_order_years_from_filter() {
    let e = endpoints();
    let html = r#"<html><body><select name="timeFilter">
        <option value="months-3">past 3 months</option>
        <option value="year-2025">2025</option>
        <option value="year-2024">2024</option>
    </select><div class="order-card"></div></body></html>"#;
    let site = Arc::new(FakeSite::new().page(e.order_list_root(), html));

    assert_eq!(fetcher(&site).order_years().await.unwrap(), vec![2025, 2024]);
}

#[tokio::test]
async fn test_order_years_fallback() {
    use chrono::Datelike;

    let e = endpoints();
    let site = Arc::new(FakeSite::new().page(e.order_list_root(), "<html><body></body></html>"));

    let years = fetcher(&site).order_years().await.unwrap();
    let current = chrono::Local::now().year();
    assert_eq!(years, (current - 4..=current).rev().collect::<Vec<_>>());
}

#[tokio::test]
async fn test_health_check_outcomes() {
    let e = endpoints();
    let root = e.order_list_root();

    let healthy = Arc::new(FakeSite::new().page(
        root.clone(),
        r#"<a href="/ap/signin?ap_email=">Sign in</a><div class="order-card"></div>"#,
    ));
    assert!(fetcher(&healthy).health_check().await.is_ok());

    let login = Arc::new(FakeSite::new().page(
        root.clone(),
        r#"<form name="signIn"><input type="email" id="ap_email"></form>"#,
    ));
    let err = fetcher(&login).health_check().await.unwrap_err();
    assert!(matches!(err, ScrapeError::SessionExpired));
    assert!(err.is_auth());

    let down = Arc::new(FakeSite::new().reply(root.clone(), Reply::Status(503)));
    assert!(matches!(
        fetcher(&down).health_check().await,
        Err(ScrapeError::Unhealthy(503))
    ));

    let rejected = Arc::new(FakeSite::new().reply(root, Reply::AuthFailure));
    assert!(fetcher(&rejected).health_check().await.unwrap_err().is_auth());
}
