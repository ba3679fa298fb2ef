//! End-to-end movie listing against a mock upstream

use cinefeed_catalog::{CatalogClient, CatalogConfig, CatalogError, ErrorKind, MovieQuery};
use cinefeed_core::retry::RetryConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> CatalogClient {
    let config = CatalogConfig::default()
        .with_base_url(format!("{}/v1.4/movie", server.uri()))
        .with_api_key("test-key")
        .with_retry(RetryConfig::default().with_initial_delay(Duration::from_millis(5)));
    CatalogClient::with_config(config).unwrap()
}

async fn respond_with(template: ResponseTemplate) -> (MockServer, CatalogClient) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(template)
        .mount(&server)
        .await;
    let client = client_for(&server);
    (server, client)
}

#[tokio::test]
async fn test_comedy_listing_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.4/movie"))
        .and(query_param("genres.name", "комедия"))
        .and(query_param("rating.kp", "7.0-10"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "2"))
        .and(query_param("sortField", "rating.kp"))
        .and(query_param("sortType", "-1"))
        .and(header("x-api-key", "test-key"))
        .and(header("accept", "application/json"))
        .and(header("accept-language", "ru"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [
                {
                    "id": 46225,
                    "name": "Джентльмены удачи",
                    "type": "movie",
                    "rating": {"kp": 8.549, "imdb": 8.1},
                    "shortDescription": "Заведующий детсадом перевоплощается в вора",
                    "year": 1971,
                    "genres": [{"name": "комедия"}, {"name": "криминал"}]
                },
                {
                    "id": 77044,
                    "alternativeName": "Friends",
                    "type": "tv-series",
                    "poster": {"url": "https://image.example/77044.jpg"},
                    "rating": {},
                    "genres": [{"name": "комедия"}]
                }
            ],
            "total": 4310,
            "limit": 2,
            "page": 1,
            "pages": 2155
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = MovieQuery::new("комедия").with_min_rating(7.0).with_limit(2);
    let result = client.movies().list(&query).await.unwrap();

    assert_eq!(result.items.len(), 2);
    assert_eq!(result.total, 4310);
    assert_eq!(result.pages, 2155);
    assert_eq!(result.source_status, 200);

    let first = &result.items[0];
    assert_eq!(first.poster, None);
    assert_eq!(first.rating, Some(8.5));
    assert_eq!(first.url.as_deref(), Some("https://www.kinopoisk.ru/film/46225/"));
    assert_eq!(first.genres, ["комедия", "криминал"]);

    let second = &result.items[1];
    assert_eq!(second.rating, None);
    assert_eq!(second.name, "Friends");
    assert_eq!(second.url.as_deref(), Some("https://www.kinopoisk.ru/series/77044/"));
}

#[tokio::test]
async fn test_zero_rating_sends_no_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"docs": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.movies().list(&MovieQuery::new("драма")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let url = &requests[0].url;
    assert!(url.query_pairs().all(|(key, _)| key != "rating.kp"));
    assert!(url.query_pairs().any(|(key, value)| key == "selectFields" && value.contains("externalId")));
}

#[tokio::test]
async fn test_missing_page_meta_falls_back_to_request() {
    let (_server, client) = respond_with(
        ResponseTemplate::new(200).set_body_json(json!({"docs": [{"id": 1}, "junk", {"id": 2}]})),
    )
    .await;

    let query = MovieQuery::new("драма").with_page(4).with_limit(7);
    let result = client.movies().list(&query).await.unwrap();

    assert_eq!(result.page, 4);
    assert_eq!(result.limit, 7);
    assert_eq!(result.pages, 1);
    assert_eq!(result.total, 2);
}

#[tokio::test]
async fn test_unauthorized_becomes_auth_error() {
    let (server, client) =
        respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad key"}))).await;

    let err = client.movies().list(&MovieQuery::new("драма")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.status_code(), 500);
    assert!(!err.to_string().contains("test-key"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rate_limit_passes_through() {
    let (server, client) = respond_with(ResponseTemplate::new(429)).await;

    let err = client.movies().list(&MovieQuery::new("драма")).await.unwrap_err();

    assert!(matches!(err, CatalogError::RateLimited));
    assert_eq!(err.status_code(), 429);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_request_keeps_status_and_body() {
    let (_server, client) = respond_with(
        ResponseTemplate::new(400).set_body_string("limit must not be greater than 250"),
    )
    .await;

    let err = client.movies().list(&MovieQuery::new("драма")).await.unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("limit must not be greater than 250"));
}

#[tokio::test]
async fn test_html_body_is_rejected() {
    let (_server, client) = respond_with(
        ResponseTemplate::new(200).set_body_raw("<html>captcha</html>", "text/html"),
    )
    .await;

    let err = client.movies().list(&MovieQuery::new("драма")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidContentType);
    assert_eq!(err.status_code(), 502);
    assert!(err.to_string().contains("text/html"));
}

#[tokio::test]
async fn test_broken_json_is_parse_error() {
    let (_server, client) = respond_with(
        ResponseTemplate::new(200).set_body_raw("{\"docs\": [", "application/json"),
    )
    .await;

    let err = client.movies().list(&MovieQuery::new("драма")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.status_code(), 502);
}
