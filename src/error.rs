//! Error types for photoembed
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for photoembed operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, the OAuth2 authorization flow, album media
/// retrieval, and settings storage.
#[derive(Error, Debug)]
pub enum PhotoEmbedError {
    /// Configuration-related errors (unreadable file, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client credentials have not been stored yet
    #[error("Client ID and Client Secret are not configured")]
    ConfigurationMissing,

    /// The authorization-code exchange or token refresh was rejected
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// An empty album id or missing access token
    #[error("Invalid album ID or authorization is missing")]
    NotAuthorizedOrInvalidInput,

    /// The media service rejected the access token
    #[error("Access token rejected by the media service")]
    TokenExpired,

    /// The media service returned a failed or non-conforming response
    #[error("Unable to fetch photos: {0}")]
    UpstreamUnavailable(String),

    /// Settings storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for photoembed operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = PhotoEmbedError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_configuration_missing_display() {
        let error = PhotoEmbedError::ConfigurationMissing;
        assert_eq!(
            error.to_string(),
            "Client ID and Client Secret are not configured"
        );
    }

    #[test]
    fn test_authorization_failed_display() {
        let error = PhotoEmbedError::AuthorizationFailed("exchange rejected".to_string());
        assert_eq!(error.to_string(), "Authorization failed: exchange rejected");
    }

    #[test]
    fn test_not_authorized_or_invalid_input_display() {
        let error = PhotoEmbedError::NotAuthorizedOrInvalidInput;
        assert_eq!(
            error.to_string(),
            "Invalid album ID or authorization is missing"
        );
    }

    #[test]
    fn test_token_expired_display() {
        let error = PhotoEmbedError::TokenExpired;
        assert_eq!(
            error.to_string(),
            "Access token rejected by the media service"
        );
    }

    #[test]
    fn test_upstream_unavailable_display() {
        let error = PhotoEmbedError::UpstreamUnavailable("missing mediaItems".to_string());
        assert_eq!(
            error.to_string(),
            "Unable to fetch photos: missing mediaItems"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let error = PhotoEmbedError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: PhotoEmbedError = io_error.into();
        assert!(matches!(error, PhotoEmbedError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: PhotoEmbedError = json_error.into();
        assert!(matches!(error, PhotoEmbedError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: PhotoEmbedError = yaml_error.into();
        assert!(matches!(error, PhotoEmbedError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PhotoEmbedError>();
    }
}
