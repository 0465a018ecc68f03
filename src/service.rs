//! High-level album service coordinating the authorization lifecycle
//!
//! [`AlbumService`] is the sole entry point for command handlers. It owns
//! the shared HTTP client, the settings store, and the configured
//! endpoints, and walks the lifecycle
//! `Unconfigured → AwaitingAuthorization → Authorized → (Expired →)
//! Authorized`:
//!
//! - [`AlbumService::authorization_url`] — start of the flow; fails with
//!   a typed error while credentials are unset.
//! - [`AlbumService::complete_authorization`] — code exchange plus atomic
//!   token persistence.
//! - [`AlbumService::authorize_interactive`] — full browser round trip
//!   using the local callback listener.
//! - [`AlbumService::valid_access_token`] — stored token with proactive
//!   refresh; a rejected refresh clears the pair, falling back to
//!   awaiting authorization.
//! - [`AlbumService::render_embed`] — the embed surface: returns markup
//!   or a human-readable failure string, never an error.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::callback::try_open_browser;
use crate::auth::{AuthFlow, CallbackListener};
use crate::config::Config;
use crate::error::{PhotoEmbedError, Result};
use crate::media::AlbumMediaFetcher;
use crate::render::render_gallery;
use crate::store::{CredentialStore, TokenPair};

/// Failure string shown in place of a gallery when the album id is empty
/// or no authorization is stored.
pub const EMBED_NOT_AUTHORIZED_MESSAGE: &str = "Invalid album ID or authorization is missing.";

/// Failure string shown in place of a gallery when the media fetch fails.
pub const EMBED_FETCH_FAILED_MESSAGE: &str = "Unable to fetch photos.";

// ---------------------------------------------------------------------------
// AlbumService
// ---------------------------------------------------------------------------

/// Coordinator for authorization, token lifecycle, and album rendering.
///
/// # Thread safety
///
/// The service itself is immutable after construction; all mutable state
/// lives in the settings database, where concurrent reads are safe and
/// concurrent writes resolve last-writer-wins.
pub struct AlbumService {
    /// Shared HTTP client used by the flow and the fetcher.
    http: Arc<reqwest::Client>,

    /// Durable settings store holding credentials and tokens.
    store: CredentialStore,

    /// Loaded configuration (endpoints, listener, timeouts).
    config: Config,
}

impl AlbumService {
    /// Creates a service over the given configuration and store.
    ///
    /// Builds the shared HTTP client with the configured request timeout.
    pub fn new(config: Config, store: CredentialStore) -> Result<Self> {
        let http = Arc::new(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.http.timeout_seconds))
                .build()?,
        );

        Ok(Self {
            http,
            store,
            config,
        })
    }

    /// Access to the underlying settings store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// The redirect URI implied by the configured callback port.
    pub fn default_redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.config.auth.redirect_port)
    }

    fn flow(&self) -> AuthFlow {
        AuthFlow::new(Arc::clone(&self.http), self.config.service.clone())
    }

    fn fetcher(&self) -> AlbumMediaFetcher {
        AlbumMediaFetcher::new(
            Arc::clone(&self.http),
            self.config.service.media_search_endpoint.clone(),
        )
    }

    // -----------------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------------

    /// Builds the authorization URL for the stored credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoEmbedError::ConfigurationMissing`] while no client
    /// credentials are stored.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<String> {
        let credentials = self
            .store
            .client_credentials()?
            .ok_or(PhotoEmbedError::ConfigurationMissing)?;
        self.flow().build_authorization_url(&credentials, redirect_uri)
    }

    /// Exchanges an authorization code and persists the resulting pair.
    ///
    /// The pair is written atomically; a failed exchange leaves the store
    /// untouched.
    pub async fn complete_authorization(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenPair> {
        let credentials = self
            .store
            .client_credentials()?
            .ok_or(PhotoEmbedError::ConfigurationMissing)?;

        let pair = self
            .flow()
            .exchange_code(code, &credentials, redirect_uri)
            .await?;
        self.store.save_token_pair(&pair)?;

        tracing::info!("authorization complete, token pair stored");
        Ok(pair)
    }

    /// Runs the full interactive authorization flow.
    ///
    /// Binds the local callback listener, prints the authorization URL to
    /// stderr (and opens the browser when configured), waits for the
    /// redirect, and completes the exchange.
    pub async fn authorize_interactive(&self) -> Result<TokenPair> {
        // Resolve credentials first so a missing configuration fails
        // before the listener is bound.
        let credentials = self
            .store
            .client_credentials()?
            .ok_or(PhotoEmbedError::ConfigurationMissing)?;

        let listener = CallbackListener::bind(self.config.auth.redirect_port).await?;
        let redirect_uri = listener.redirect_uri()?;

        let auth_url = self
            .flow()
            .build_authorization_url(&credentials, &redirect_uri)?;

        eprintln!("Open the following URL in your browser to authorize access:\n{auth_url}");
        if self.config.auth.open_browser {
            try_open_browser(&auth_url);
        }

        let code = listener.accept_code().await?;
        self.complete_authorization(&code, &redirect_uri).await
    }

    // -----------------------------------------------------------------------
    // Token lifecycle
    // -----------------------------------------------------------------------

    /// Returns a usable access token, refreshing proactively when the
    /// stored one is expired or about to expire.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoEmbedError::AuthorizationFailed`] when no pair is
    /// stored or the refresh token is rejected. In the latter case the
    /// stored tokens are cleared — the lifecycle falls back to awaiting
    /// authorization.
    pub async fn valid_access_token(&self) -> Result<String> {
        let pair = self.store.token_pair()?.ok_or_else(|| {
            PhotoEmbedError::AuthorizationFailed(
                "no stored tokens; run the authorization flow first".to_string(),
            )
        })?;

        if !pair.is_expired() {
            return Ok(pair.access_token);
        }

        tracing::debug!("stored access token expired, refreshing");
        let refreshed = self.refresh_stored(&pair).await?;
        Ok(refreshed.access_token)
    }

    /// Refreshes the stored pair, clearing it when the service rejects
    /// the refresh token.
    async fn refresh_stored(&self, pair: &TokenPair) -> Result<TokenPair> {
        let credentials = self
            .store
            .client_credentials()?
            .ok_or(PhotoEmbedError::ConfigurationMissing)?;

        match self
            .flow()
            .refresh_tokens(&pair.refresh_token, &credentials)
            .await
        {
            Ok(refreshed) => {
                self.store.save_token_pair(&refreshed)?;
                Ok(refreshed)
            }
            Err(err) => {
                // A rejected refresh token is unusable from here on; drop
                // the pair so the operator is prompted to re-authorize.
                tracing::warn!("token refresh rejected, clearing stored tokens");
                self.store.clear_tokens()?;
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Embed surface
    // -----------------------------------------------------------------------

    /// Renders the album as gallery markup, or a human-readable failure
    /// string. This surface never returns an error.
    ///
    /// An empty album id or missing authorization yields
    /// [`EMBED_NOT_AUTHORIZED_MESSAGE`]; any fetch failure yields
    /// [`EMBED_FETCH_FAILED_MESSAGE`]. When the service rejects the
    /// access token, one refresh-and-retry is attempted before giving up.
    pub async fn render_embed(&self, album_id: &str) -> String {
        match self.try_render(album_id).await {
            Ok(markup) => markup,
            Err(err) => {
                tracing::warn!(album_id, error = %err, "embed rendering failed");
                match err.downcast_ref::<PhotoEmbedError>() {
                    Some(PhotoEmbedError::NotAuthorizedOrInvalidInput)
                    | Some(PhotoEmbedError::ConfigurationMissing)
                    | Some(PhotoEmbedError::AuthorizationFailed(_)) => {
                        EMBED_NOT_AUTHORIZED_MESSAGE.to_string()
                    }
                    _ => EMBED_FETCH_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    async fn try_render(&self, album_id: &str) -> Result<String> {
        if album_id.is_empty() {
            return Err(PhotoEmbedError::NotAuthorizedOrInvalidInput.into());
        }

        let pair = self
            .store
            .token_pair()?
            .ok_or(PhotoEmbedError::NotAuthorizedOrInvalidInput)?;

        let access_token = if pair.is_expired() {
            self.refresh_stored(&pair).await?.access_token
        } else {
            pair.access_token.clone()
        };

        match self.fetcher().fetch_album_media(album_id, &access_token).await {
            Ok(items) => Ok(render_gallery(&items)),
            Err(err)
                if matches!(
                    err.downcast_ref::<PhotoEmbedError>(),
                    Some(PhotoEmbedError::TokenExpired)
                ) =>
            {
                // The expiry timestamp lied (or was absent): refresh once
                // and retry once. Re-load the pair in case a proactive
                // refresh above already rotated the refresh token.
                tracing::debug!("access token rejected mid-fetch, refreshing once");
                let current = self
                    .store
                    .token_pair()?
                    .ok_or(PhotoEmbedError::NotAuthorizedOrInvalidInput)?;
                let refreshed = self.refresh_stored(&current).await?;
                let items = self
                    .fetcher()
                    .fetch_album_media(album_id, &refreshed.access_token)
                    .await?;
                Ok(render_gallery(&items))
            }
            Err(err) => Err(err),
        }
    }
}
