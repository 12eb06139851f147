//! Integration tests for `ListenNotesSearchClient` using wiremock HTTP mocks.

use std::time::Duration;

use nudge_search::{ListenNotesSearchClient, SearchClient, SearchError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ListenNotesSearchClient {
    ListenNotesSearchClient::new(Some("test-key"), base_url, "Nudge-Podcast-Bot/1.0", 5)
        .expect("client construction should not fail")
        .with_retry_delay(Duration::ZERO)
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn one_result() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {
                "id": "abc123",
                "title_original": "Masters Strength Lab",
                "description_original": "Training for masters athletes.",
                "rss": "https://feeds.example.com/masters.xml",
                "listen_score": 72,
                "language": "English"
            }
        ]
    })
}

#[tokio::test]
async fn search_sends_key_and_query_and_maps_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "podcast"))
        .and(query_param("len", "50"))
        .and(query_param("q", "masters hyrox"))
        .and(header("X-ListenAPI-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_result()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client
        .search(&keywords(&["masters", "hyrox"]), 60, &CancellationToken::new())
        .await
        .expect("search should succeed");

    assert_eq!(candidates.len(), 1);
    let c = &candidates[0];
    assert_eq!(c.id, "listennotes:abc123");
    assert_eq!(c.name, "Masters Strength Lab");
    assert_eq!(c.feed_url, "https://feeds.example.com/masters.xml");
    assert_eq!(c.language.as_deref(), Some("English"));
    assert!((c.estimated_reach - 0.72).abs() < 1e-9);
}

#[tokio::test]
async fn server_error_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_result()))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = test_client(&server.uri())
        .search(&keywords(&["masters"]), 60, &CancellationToken::new())
        .await
        .expect("retry should succeed");
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn rate_limit_honours_retry_after_zero_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_result()))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = test_client(&server.uri())
        .search(&keywords(&["masters"]), 60, &CancellationToken::new())
        .await
        .expect("retry should succeed");
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn persistent_server_error_yields_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let candidates = test_client(&server.uri())
        .search(&keywords(&["masters"]), 60, &CancellationToken::new())
        .await
        .expect("non-success status is not an error");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = test_client(&server.uri())
        .search(&keywords(&["masters"]), 60, &CancellationToken::new())
        .await
        .unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search(&keywords(&["masters"]), 60, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn cancellation_interrupts_slow_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(one_result())
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

    let err = test_client(&server.uri())
        .search(&keywords(&["masters"]), 60, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Cancelled), "got {err:?}");
}
