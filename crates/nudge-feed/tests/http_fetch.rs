//! Integration tests for the HTTP feed fetchers using wiremock HTTP mocks.

use std::sync::Arc;
use std::time::Duration;

use nudge_feed::{parse_feed, FeedError, FeedFetcher, HttpFeedFetcher, RetryingFeedFetcher};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Masters Strength Lab</title>
    <itunes:owner><itunes:email>lab@masters.fm</itunes:email></itunes:owner>
    <item><title>VO2 max training for masters athletes</title><pubDate>Fri, 20 Feb 2026 10:00:00 GMT</pubDate></item>
  </channel>
</rss>"#;

fn test_fetcher() -> HttpFeedFetcher {
    HttpFeedFetcher::new("Nudge-Podcast-Bot/1.0", 5).expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_returns_body_and_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .and(header("user-agent", "Nudge-Podcast-Bot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/feed.xml", server.uri());
    let body = test_fetcher()
        .fetch(&url, &CancellationToken::new())
        .await
        .expect("should fetch feed");

    let outcome = parse_feed(&body);
    let payload = outcome.payload().expect("feed should parse");
    assert_eq!(payload.contact_email.as_deref(), Some("lab@masters.fm"));
    assert_eq!(payload.episodes.len(), 1);
}

#[tokio::test]
async fn not_found_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing.xml", server.uri());
    let err = test_fetcher()
        .fetch(&url, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, FeedError::Status { status: 404, .. }), "got {err:?}");
    assert_eq!(err.failure_reason(), "HTTP 404");
}

#[tokio::test]
async fn retrying_fetcher_recovers_from_transient_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.xml"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = RetryingFeedFetcher::with_backoff(Arc::new(test_fetcher()), Duration::ZERO);
    let url = format!("{}/flaky.xml", server.uri());
    let body = fetcher
        .fetch(&url, &CancellationToken::new())
        .await
        .expect("second attempt should succeed");
    assert!(body.contains("Masters Strength Lab"));
}

#[tokio::test]
async fn retrying_fetcher_reports_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down.xml"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = RetryingFeedFetcher::with_backoff(Arc::new(test_fetcher()), Duration::ZERO);
    let url = format!("{}/down.xml", server.uri());
    let err = fetcher
        .fetch(&url, &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.failure_reason(), "HTTP 500");
}

#[tokio::test]
async fn cancellation_interrupts_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FEED)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let url = format!("{}/slow.xml", server.uri());
    let err = test_fetcher().fetch(&url, &cancel).await.unwrap_err();
    assert!(err.is_cancelled(), "got {err:?}");
}
