//! Configuration management for photoembed
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PhotoEmbedError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for photoembed
///
/// This structure holds all configuration needed to talk to the remote
/// photo service: endpoint locations, the redirect listener, HTTP client
/// behavior, and the settings database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote photo service endpoints and scope
    #[serde(default)]
    pub service: ServiceConfig,

    /// Authorization redirect listener settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Settings storage location
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            auth: AuthConfig::default(),
            http: HttpConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Remote photo service configuration
///
/// Defaults target Google Photos; every endpoint can be pointed elsewhere
/// (a mock server in tests, or another service with the same contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// OAuth2 authorization endpoint shown to the operator
    #[serde(default = "default_authorization_endpoint")]
    pub authorization_endpoint: String,

    /// OAuth2 token endpoint used for code exchange and refresh
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    /// Media search endpoint used to list an album's items
    #[serde(default = "default_media_search_endpoint")]
    pub media_search_endpoint: String,

    /// OAuth2 scope requested during authorization
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_authorization_endpoint() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_endpoint() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_media_search_endpoint() -> String {
    "https://photoslibrary.googleapis.com/v1/mediaItems:search".to_string()
}

fn default_scope() -> String {
    "https://www.googleapis.com/auth/photoslibrary.readonly".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            authorization_endpoint: default_authorization_endpoint(),
            token_endpoint: default_token_endpoint(),
            media_search_endpoint: default_media_search_endpoint(),
            scope: default_scope(),
        }
    }
}

/// Authorization redirect listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Local TCP port for the redirect callback
    ///
    /// The resulting `http://127.0.0.1:<port>/callback` URI must be
    /// registered with the photo service. Use `0` to let the OS pick a
    /// free port (only useful against services that allow wildcard
    /// loopback redirects).
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,

    /// Attempt to open the authorization URL in the system browser
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_redirect_port() -> u16 {
    8787
}

fn default_open_browser() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            redirect_port: default_redirect_port(),
            open_browser: default_open_browser(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout applied to every remote request (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Settings storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Path to the settings database file
    ///
    /// When unset, the platform data directory is used. The
    /// `PHOTOEMBED_SETTINGS_DB` environment variable takes priority over
    /// both.
    #[serde(default)]
    pub settings_db: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PhotoEmbedError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PhotoEmbedError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(endpoint) = std::env::var("PHOTOEMBED_AUTHORIZATION_ENDPOINT") {
            self.service.authorization_endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("PHOTOEMBED_TOKEN_ENDPOINT") {
            self.service.token_endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("PHOTOEMBED_MEDIA_SEARCH_ENDPOINT") {
            self.service.media_search_endpoint = endpoint;
        }

        if let Ok(scope) = std::env::var("PHOTOEMBED_SCOPE") {
            self.service.scope = scope;
        }

        if let Ok(port) = std::env::var("PHOTOEMBED_REDIRECT_PORT") {
            if let Ok(value) = port.parse() {
                self.auth.redirect_port = value;
            } else {
                tracing::warn!("Invalid PHOTOEMBED_REDIRECT_PORT: {}", port);
            }
        }

        if let Ok(timeout) = std::env::var("PHOTOEMBED_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.http.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid PHOTOEMBED_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db_path) = &cli.settings_db {
            self.store.settings_db = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`PhotoEmbedError::Config`] when an endpoint is not a valid
    /// URL, the scope is empty, or the HTTP timeout is zero.
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("authorization_endpoint", &self.service.authorization_endpoint),
            ("token_endpoint", &self.service.token_endpoint),
            ("media_search_endpoint", &self.service.media_search_endpoint),
        ] {
            url::Url::parse(endpoint).map_err(|e| {
                PhotoEmbedError::Config(format!("Invalid {}: {} ({})", name, endpoint, e))
            })?;
        }

        if self.service.scope.trim().is_empty() {
            return Err(PhotoEmbedError::Config("scope must not be empty".to_string()).into());
        }

        if self.http.timeout_seconds == 0 {
            return Err(
                PhotoEmbedError::Config("timeout_seconds must be greater than zero".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}
