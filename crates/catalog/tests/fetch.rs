//! Retry behavior of the resilient fetcher against a mock upstream

use cinefeed_catalog::query::translate;
use cinefeed_catalog::{CatalogClient, CatalogConfig, CatalogError, MovieQuery};
use cinefeed_core::retry::RetryConfig;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE_DELAY: Duration = Duration::from_millis(20);

fn config_for(base_url: String) -> CatalogConfig {
    CatalogConfig::default()
        .with_base_url(base_url)
        .with_api_key("test-key")
        .with_timeout(Duration::from_secs(2))
        .with_connect_timeout(Duration::from_secs(1))
        .with_retry(RetryConfig::default().with_initial_delay(BASE_DELAY))
}

fn client_for(server: &MockServer) -> CatalogClient {
    CatalogClient::with_config(config_for(format!("{}/v1.4/movie", server.uri()))).unwrap()
}

#[tokio::test]
async fn test_retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.4/movie"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.4/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"docs": []})))
        .with_priority(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .fetch(&translate(&MovieQuery::new("драма")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 3);
    assert_eq!(response.backoffs, vec![BASE_DELAY, BASE_DELAY * 2]);
    assert!(response.elapsed >= BASE_DELAY * 3);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .fetch(&translate(&MovieQuery::new("драма")))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.attempts, 1);
    assert!(response.backoffs.is_empty());
    assert_eq!(response.body, "not found");
}

#[tokio::test]
async fn test_persistent_server_error_returns_last_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(6)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .fetch(&translate(&MovieQuery::new("драма")))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert_eq!(response.attempts, 3);
    assert_eq!(response.backoffs.len(), 2);

    let err = client.movies().list(&MovieQuery::new("драма")).await.unwrap_err();
    assert!(matches!(err, CatalogError::UpstreamServer { status: 503, .. }));
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn test_transport_failure_gives_up_after_budget() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        CatalogClient::with_config(config_for(format!("http://{addr}/v1.4/movie"))).unwrap();

    let err = client
        .fetch(&translate(&MovieQuery::new("драма")))
        .await
        .unwrap_err();

    assert_eq!(err.attempts, 3);
    assert_eq!(err.backoffs, vec![BASE_DELAY, BASE_DELAY * 2]);

    let err = client.movies().list(&MovieQuery::new("драма")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Network { attempts: 3, .. }));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_single_attempt_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(format!("{}/v1.4/movie", server.uri()))
        .with_retry(RetryConfig::no_retry());
    let client = CatalogClient::with_config(config).unwrap();

    let response = client
        .fetch(&translate(&MovieQuery::new("драма")))
        .await
        .unwrap();
    assert_eq!(response.attempts, 1);
    assert!(response.backoffs.is_empty());
}

#[tokio::test]
async fn test_follows_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.3/movie"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("Location", format!("{}/v1.4/movie", server.uri())),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.4/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"docs": [], "total": 0})))
        .mount(&server)
        .await;

    let client =
        CatalogClient::with_config(config_for(format!("{}/v1.3/movie", server.uri()))).unwrap();
    let response = client
        .fetch(&translate(&MovieQuery::new("драма")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 1);
}

#[tokio::test]
async fn test_concurrent_fetches_share_bounded_pool() {
    const UPSTREAM_DELAY: Duration = Duration::from_millis(100);
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"docs": []}))
                .set_delay(UPSTREAM_DELAY),
        )
        .expect(4)
        .mount(&server)
        .await;

    let mut config = config_for(format!("{}/v1.4/movie", server.uri()));
    config.pool.max_connections = 1;
    let client = CatalogClient::with_config(config).unwrap();
    let params = translate(&MovieQuery::new("драма"));

    let started = Instant::now();
    let (a, b, c, d) = tokio::join!(
        client.fetch(&params),
        client.fetch(&params),
        client.fetch(&params),
        client.fetch(&params),
    );

    let elapsed = started.elapsed();

    for response in [a, b, c, d] {
        assert_eq!(response.unwrap().status, 200);
    }
    // One permit means the four attempts run back to back.
    assert!(
        elapsed >= UPSTREAM_DELAY * 4,
        "fetches overlapped: finished in {elapsed:?}"
    );
}
