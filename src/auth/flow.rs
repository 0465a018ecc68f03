//! Authorization URL construction, code exchange, and token refresh
//!
//! The flow is the classic OAuth2 confidential-client shape: the
//! authorization URL carries exactly the five query parameters the service
//! expects (`response_type=code`, `client_id`, `redirect_uri`, `scope`,
//! `access_type=offline`), and the token endpoint is driven with form
//! POSTs. Authorization codes are single-use and short-lived; a failed
//! exchange is never retried — the operator restarts from the
//! authorization URL.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use url::Url;

use crate::config::ServiceConfig;
use crate::error::{PhotoEmbedError, Result};
use crate::store::{ClientCredentials, TokenPair};

// Upper bound applied to `expires_in` so absurd values cannot overflow the
// timestamp arithmetic. Ten years, in seconds.
const MAX_EXPIRES_IN_SECONDS: i64 = 315_360_000;

// ---------------------------------------------------------------------------
// Token endpoint response (raw deserialization)
// ---------------------------------------------------------------------------

/// Raw JSON response from the OAuth2 token endpoint.
///
/// This private type is used only inside [`AuthFlow`] to deserialize the
/// token response before converting it into a [`TokenPair`]. Every field is
/// optional at the wire level; the conversion enforces which ones are
/// required for each grant type.
#[derive(Debug, serde::Deserialize)]
struct TokenEndpointResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl TokenEndpointResponse {
    /// Converts the raw response into a [`TokenPair`].
    ///
    /// `access_token` must always be present. When the response omits
    /// `refresh_token`, `previous_refresh` (the token that was just
    /// exchanged) is carried over; if neither exists the response is
    /// rejected. `expires_in` seconds become an absolute UTC timestamp.
    fn into_token_pair(self, previous_refresh: Option<String>) -> Result<TokenPair> {
        let access_token = self.access_token.ok_or_else(|| {
            PhotoEmbedError::AuthorizationFailed("token response missing access_token".to_string())
        })?;

        let refresh_token = match self.refresh_token.or(previous_refresh) {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(PhotoEmbedError::AuthorizationFailed(
                    "token response missing refresh_token".to_string(),
                )
                .into())
            }
        };

        let expires_at = self
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs.min(MAX_EXPIRES_IN_SECONDS)));

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at,
        })
    }
}

// ---------------------------------------------------------------------------
// AuthFlow
// ---------------------------------------------------------------------------

/// Drives the OAuth2 authorization-code flow against the configured
/// service endpoints.
///
/// An `AuthFlow` does not persist tokens; that is the responsibility of
/// [`CredentialStore`](crate::store::CredentialStore), coordinated by
/// [`AlbumService`](crate::service::AlbumService).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use photoembed::auth::AuthFlow;
/// use photoembed::config::ServiceConfig;
/// use photoembed::store::ClientCredentials;
///
/// let flow = AuthFlow::new(Arc::new(reqwest::Client::new()), ServiceConfig::default());
/// let credentials = ClientCredentials {
///     client_id: "my-client".to_string(),
///     client_secret: "my-secret".to_string(),
/// };
///
/// let url = flow
///     .build_authorization_url(&credentials, "http://127.0.0.1:8787/callback")
///     .unwrap();
/// assert!(url.contains("response_type=code"));
/// ```
pub struct AuthFlow {
    http: Arc<reqwest::Client>,
    service: ServiceConfig,
}

impl AuthFlow {
    /// Creates a new `AuthFlow` for the given service endpoints.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client for all token endpoint requests.
    /// * `service` - Endpoint and scope configuration.
    pub fn new(http: Arc<reqwest::Client>, service: ServiceConfig) -> Self {
        Self { http, service }
    }

    /// Builds the authorization URL shown to the operator.
    ///
    /// The construction is deterministic: the same credentials and
    /// redirect URI always produce the same URL, carrying exactly
    /// `response_type=code`, `client_id`, `redirect_uri`, `scope`, and
    /// `access_type=offline`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoEmbedError::ConfigurationMissing`] when either
    /// credential is empty — callers check configuration before offering
    /// the URL — and [`PhotoEmbedError::Config`] when the configured
    /// authorization endpoint is not a valid URL.
    pub fn build_authorization_url(
        &self,
        credentials: &ClientCredentials,
        redirect_uri: &str,
    ) -> Result<String> {
        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            return Err(PhotoEmbedError::ConfigurationMissing.into());
        }

        let mut url = Url::parse(&self.service.authorization_endpoint).map_err(|e| {
            PhotoEmbedError::Config(format!("invalid authorization endpoint URL: {e}"))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", &credentials.client_id);
            query.append_pair("redirect_uri", redirect_uri);
            query.append_pair("scope", &self.service.scope);
            query.append_pair("access_type", "offline");
        }

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for a token pair.
    ///
    /// Issues a single POST to the token endpoint with the form body
    /// `{code, client_id, client_secret, redirect_uri,
    /// grant_type=authorization_code}`. Success requires the response to
    /// carry both `access_token` and `refresh_token`; the caller persists
    /// the returned pair.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoEmbedError::AuthorizationFailed`] on a missing code,
    /// a non-2xx response, a malformed body, or an absent token field.
    /// Nothing is persisted on failure; the code is single-use, so the
    /// operator must restart from [`build_authorization_url`](Self::build_authorization_url).
    pub async fn exchange_code(
        &self,
        code: &str,
        credentials: &ClientCredentials,
        redirect_uri: &str,
    ) -> Result<TokenPair> {
        if code.is_empty() {
            return Err(PhotoEmbedError::AuthorizationFailed(
                "authorization code is missing".to_string(),
            )
            .into());
        }

        let params = [
            ("code", code),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        tracing::debug!("exchanging authorization code at token endpoint");
        let raw = self.post_token_endpoint(&params).await?;
        raw.into_token_pair(None)
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// POSTs to the token endpoint with `grant_type=refresh_token`. The
    /// returned pair replaces only the access token (and expiry) when the
    /// response omits `refresh_token`; a new refresh token in the response
    /// replaces the old one.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoEmbedError::AuthorizationFailed`] when the refresh
    /// token is empty, the endpoint rejects the request, or the response
    /// is malformed. A rejected refresh token means the operator must
    /// re-run the authorization flow.
    pub async fn refresh_tokens(
        &self,
        refresh_token: &str,
        credentials: &ClientCredentials,
    ) -> Result<TokenPair> {
        if refresh_token.is_empty() {
            return Err(PhotoEmbedError::AuthorizationFailed(
                "no refresh token available".to_string(),
            )
            .into());
        }

        let params = [
            ("refresh_token", refresh_token),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];

        tracing::debug!("refreshing access token at token endpoint");
        let raw = self.post_token_endpoint(&params).await?;
        raw.into_token_pair(Some(refresh_token.to_string()))
    }

    /// POSTs a form body to the token endpoint and deserializes the
    /// response, mapping every failure to `AuthorizationFailed`.
    async fn post_token_endpoint(
        &self,
        params: &[(&str, &str)],
    ) -> Result<TokenEndpointResponse> {
        let resp = self
            .http
            .post(&self.service.token_endpoint)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                PhotoEmbedError::AuthorizationFailed(format!("token request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PhotoEmbedError::AuthorizationFailed(format!(
                "token endpoint returned {status}: {body}"
            ))
            .into());
        }

        resp.json().await.map_err(|e| {
            PhotoEmbedError::AuthorizationFailed(format!("failed to parse token response: {e}"))
                .into()
        })
    }
}

/// Formats the token expiry for operator-facing output.
pub(crate) fn describe_expiry(expires_at: Option<DateTime<Utc>>) -> String {
    match expires_at {
        Some(at) => format!("expires at {}", at.to_rfc3339()),
        None => "no reported expiry".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
