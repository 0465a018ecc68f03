//! Album media retrieval integration tests using wiremock
//!
//! Verifies `src/media.rs`:
//!
//! - Preconditions (empty album id or token) fail without a network call.
//! - The search request carries the Bearer header and the `albumId` body.
//! - `401` maps to `TokenExpired`; every other failure, including a body
//!   without `mediaItems`, maps to `UpstreamUnavailable`.
//! - Items missing fields pass through with empty strings.

use std::sync::Arc;

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use photoembed::media::AlbumMediaFetcher;
use photoembed::PhotoEmbedError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_fetcher(base_url: &str) -> AlbumMediaFetcher {
    AlbumMediaFetcher::new(
        Arc::new(reqwest::Client::new()),
        format!("{}/mediaItems:search", base_url),
    )
}

/// Returns a one-item media search response body.
fn one_item_body() -> serde_json::Value {
    serde_json::json!({
        "mediaItems": [
            { "id": "m1", "baseUrl": "https://x/y", "description": "cat" }
        ]
    })
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// Empty album id and empty access token must both short-circuit without
/// touching the endpoint.
#[tokio::test]
async fn test_preconditions_fail_without_network_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_item_body()))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri());

    for (album_id, token) in [("", "token"), ("album1", "")] {
        let err = fetcher
            .fetch_album_media(album_id, token)
            .await
            .expect_err("precondition failure expected");
        assert!(
            matches!(
                err.downcast_ref::<PhotoEmbedError>(),
                Some(PhotoEmbedError::NotAuthorizedOrInvalidInput)
            ),
            "expected NotAuthorizedOrInvalidInput, got: {err}"
        );
    }

    // Zero requests must have reached the mock endpoint.
    server.verify().await;
}

// ---------------------------------------------------------------------------
// Request shape and success mapping
// ---------------------------------------------------------------------------

/// The search request must carry `Authorization: Bearer <token>` and the
/// JSON body `{"albumId": ...}`, and the response item must map onto a
/// `MediaItem` field by field.
#[tokio::test]
async fn test_fetch_sends_bearer_header_and_album_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mediaItems:search"))
        .and(header("authorization", "Bearer token123"))
        .and(body_json(serde_json::json!({ "albumId": "album1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_item_body()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri());
    let items = fetcher
        .fetch_album_media("album1", "token123")
        .await
        .expect("fetch must succeed");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "m1");
    assert_eq!(items[0].base_url, "https://x/y");
    assert_eq!(items[0].description, "cat");

    server.verify().await;
}

/// An empty `mediaItems` array is a valid response: the album has no
/// items.
#[tokio::test]
async fn test_fetch_empty_album_yields_empty_sequence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mediaItems:search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "mediaItems": [] })),
        )
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri());
    let items = fetcher
        .fetch_album_media("album1", "token")
        .await
        .expect("empty album must not be an error");
    assert!(items.is_empty());
}

/// Items missing `baseUrl` or `description` pass through with empty
/// strings -- no per-item validation rejects entries.
#[tokio::test]
async fn test_fetch_passes_through_items_missing_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mediaItems:search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "mediaItems": [
                { "id": "m1" },
                { "baseUrl": "https://x/z" }
            ]
        })))
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri());
    let items = fetcher
        .fetch_album_media("album1", "token")
        .await
        .expect("items with missing fields must pass through");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].base_url, "");
    assert_eq!(items[0].description, "");
    assert_eq!(items[1].id, "");
    assert_eq!(items[1].base_url, "https://x/z");
}

// ---------------------------------------------------------------------------
// Failure mapping
// ---------------------------------------------------------------------------

/// A `401 Unauthorized` must map to `TokenExpired` so callers can refresh
/// and retry.
#[tokio::test]
async fn test_fetch_maps_401_to_token_expired() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mediaItems:search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri());
    let err = fetcher
        .fetch_album_media("album1", "stale_token")
        .await
        .expect_err("401 must be an error");
    assert!(matches!(
        err.downcast_ref::<PhotoEmbedError>(),
        Some(PhotoEmbedError::TokenExpired)
    ));
}

/// Any other non-2xx status maps to `UpstreamUnavailable`.
#[tokio::test]
async fn test_fetch_maps_server_error_to_upstream_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mediaItems:search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri());
    let err = fetcher
        .fetch_album_media("album1", "token")
        .await
        .expect_err("500 must be an error");
    assert!(matches!(
        err.downcast_ref::<PhotoEmbedError>(),
        Some(PhotoEmbedError::UpstreamUnavailable(_))
    ));
}

/// A 200 body without the `mediaItems` field (quota errors, malformed
/// responses) maps to `UpstreamUnavailable` -- deliberately indistinct.
#[tokio::test]
async fn test_fetch_maps_missing_media_items_to_upstream_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mediaItems:search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": { "code": 429, "message": "Quota exceeded" }
        })))
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri());
    let err = fetcher
        .fetch_album_media("album1", "token")
        .await
        .expect_err("missing mediaItems must be an error");
    assert!(matches!(
        err.downcast_ref::<PhotoEmbedError>(),
        Some(PhotoEmbedError::UpstreamUnavailable(_))
    ));
}
