//! Album media retrieval from the remote photo service
//!
//! A fetch is one authenticated POST to the media-search endpoint. Only
//! the first page of results is used; the service's pagination token is
//! ignored. Provider data is canonical: items missing a `baseUrl` or
//! `description` pass through with empty strings rather than being
//! rejected.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{PhotoEmbedError, Result};

// ---------------------------------------------------------------------------
// MediaItem
// ---------------------------------------------------------------------------

/// A single photo or video reference in an album.
///
/// `base_url` is a direct link that the service only honors for a short,
/// service-defined window, so items are fetched per render request and
/// never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Opaque item identifier.
    pub id: String,

    /// Time-limited direct URL to the media bytes.
    pub base_url: String,

    /// Operator-supplied description; may be empty.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MediaSearchResponse {
    #[serde(rename = "mediaItems")]
    media_items: Option<Vec<RawMediaItem>>,
}

#[derive(Debug, Deserialize)]
struct RawMediaItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "baseUrl", default)]
    base_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl RawMediaItem {
    fn into_media_item(self) -> MediaItem {
        MediaItem {
            id: self.id.unwrap_or_default(),
            base_url: self.base_url.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AlbumMediaFetcher
// ---------------------------------------------------------------------------

/// Fetches the media items of a named album.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use photoembed::media::AlbumMediaFetcher;
///
/// # async fn example() -> photoembed::error::Result<()> {
/// let fetcher = AlbumMediaFetcher::new(
///     Arc::new(reqwest::Client::new()),
///     "https://photoslibrary.googleapis.com/v1/mediaItems:search".to_string(),
/// );
/// let items = fetcher.fetch_album_media("album1", "my_access_token").await?;
/// println!("album has {} items", items.len());
/// # Ok(())
/// # }
/// ```
pub struct AlbumMediaFetcher {
    http: Arc<reqwest::Client>,
    search_endpoint: String,
}

impl AlbumMediaFetcher {
    /// Creates a fetcher against the given media-search endpoint.
    pub fn new(http: Arc<reqwest::Client>, search_endpoint: String) -> Self {
        Self {
            http,
            search_endpoint,
        }
    }

    /// Fetches the first page of media items in the album.
    ///
    /// Issues one POST with `Authorization: Bearer <access_token>` and the
    /// JSON body `{"albumId": ...}`.
    ///
    /// # Errors
    ///
    /// - [`PhotoEmbedError::NotAuthorizedOrInvalidInput`] when the album
    ///   id or access token is empty; no network call is made.
    /// - [`PhotoEmbedError::TokenExpired`] when the service answers
    ///   `401 Unauthorized`; callers may refresh and retry once.
    /// - [`PhotoEmbedError::UpstreamUnavailable`] for every other failed
    ///   or non-conforming response (quota errors, malformed bodies, and a
    ///   missing `mediaItems` field are deliberately indistinct).
    pub async fn fetch_album_media(
        &self,
        album_id: &str,
        access_token: &str,
    ) -> Result<Vec<MediaItem>> {
        if album_id.is_empty() || access_token.is_empty() {
            return Err(PhotoEmbedError::NotAuthorizedOrInvalidInput.into());
        }

        let body = serde_json::json!({ "albumId": album_id });

        tracing::debug!(album_id, "searching album media");
        let resp = self
            .http
            .post(&self.search_endpoint)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PhotoEmbedError::UpstreamUnavailable(format!("media search request failed: {e}"))
            })?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PhotoEmbedError::TokenExpired.into());
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PhotoEmbedError::UpstreamUnavailable(format!(
                "media endpoint returned {status}: {body}"
            ))
            .into());
        }

        let raw: MediaSearchResponse = resp.json().await.map_err(|e| {
            PhotoEmbedError::UpstreamUnavailable(format!("failed to parse media response: {e}"))
        })?;

        let items = raw.media_items.ok_or_else(|| {
            PhotoEmbedError::UpstreamUnavailable("media response missing mediaItems".to_string())
        })?;

        Ok(items.into_iter().map(RawMediaItem::into_media_item).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
