//! Durable settings storage for client credentials and OAuth tokens
//!
//! The store is a plain key-value table in a SQLite file: four well-known
//! string settings (`client_id`, `client_secret`, `access_token`,
//! `refresh_token`) plus the computed access-token expiry. Every call opens
//! its own connection, so concurrent readers are safe and concurrent
//! writers resolve last-writer-wins.

use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

use crate::config::StoreConfig;
use crate::error::{PhotoEmbedError, Result};

/// Setting key for the OAuth2 client ID.
pub const KEY_CLIENT_ID: &str = "client_id";
/// Setting key for the OAuth2 client secret.
pub const KEY_CLIENT_SECRET: &str = "client_secret";
/// Setting key for the current access token.
pub const KEY_ACCESS_TOKEN: &str = "access_token";
/// Setting key for the current refresh token.
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";
/// Setting key for the access token expiry (RFC 3339).
pub const KEY_ACCESS_TOKEN_EXPIRES_AT: &str = "access_token_expires_at";

// ---------------------------------------------------------------------------
// ClientCredentials
// ---------------------------------------------------------------------------

/// OAuth2 client credentials issued by the photo service.
///
/// Set once by the operator and immutable until changed. Absence of either
/// field is a precondition failure for the authorization flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// OAuth2 client ID.
    pub client_id: String,

    /// OAuth2 client secret.
    pub client_secret: String,
}

// ---------------------------------------------------------------------------
// TokenPair
// ---------------------------------------------------------------------------

/// An access/refresh token pair issued by the token endpoint.
///
/// Created on a successful authorization-code exchange and replaced
/// wholesale on refresh. The pair is persisted atomically: the store never
/// holds an access token without its refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived credential authorizing API calls.
    pub access_token: String,

    /// Long-lived credential used to mint new access tokens.
    pub refresh_token: String,

    /// UTC timestamp at which the access token expires.
    ///
    /// Derived from the token endpoint's `expires_in` seconds. `None` when
    /// the endpoint did not report an expiry; such tokens are refreshed
    /// only after the media service rejects them.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenPair {
    /// Returns `true` when the access token is expired or about to expire.
    ///
    /// A 60-second buffer is applied so that callers have time to exchange
    /// the refresh token before the access token is rejected by the media
    /// service. Pairs with no `expires_at` value are treated as valid.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(60);
                Utc::now() >= expires_at - buffer
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Durable key-value store backing the authorization lifecycle.
///
/// # Examples
///
/// ```
/// use photoembed::store::CredentialStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = CredentialStore::open_at(dir.path().join("settings.db")).unwrap();
/// store.set("client_id", "my-client").unwrap();
/// assert_eq!(store.get("client_id").unwrap().as_deref(), Some("my-client"));
/// assert!(store.get("missing").unwrap().is_none());
/// ```
pub struct CredentialStore {
    db_path: PathBuf,
}

impl CredentialStore {
    /// Create a store at the default location.
    ///
    /// Honors the `PHOTOEMBED_SETTINGS_DB` environment variable; otherwise
    /// the platform data directory is used.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("PHOTOEMBED_SETTINGS_DB") {
            return Self::open_at(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "xbcsmith", "photoembed").ok_or_else(|| {
            PhotoEmbedError::Storage("Could not determine data directory".into())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;

        Self::open_at(data_dir.join("settings.db"))
    }

    /// Create a store backed by the specified database file.
    ///
    /// Primarily useful for tests where the platform data directory is not
    /// desirable.
    pub fn open_at<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for settings database")
                .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Create a store from the loaded configuration.
    ///
    /// The `PHOTOEMBED_SETTINGS_DB` environment variable wins over the
    /// config file's `store.settings_db`, which wins over the platform
    /// default.
    pub fn from_config(store_config: &StoreConfig) -> Result<Self> {
        if std::env::var("PHOTOEMBED_SETTINGS_DB").is_ok() {
            return Self::new();
        }
        match &store_config.settings_db {
            Some(path) => Self::open_at(path),
            None => Self::new(),
        }
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create settings table")
        .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open settings database")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()).into())
    }

    /// Read a setting, returning `None` when it has never been written.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to read setting")
        .map_err(|e| PhotoEmbedError::Storage(e.to_string()).into())
    }

    /// Write a setting, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to write setting")
        .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Remove a setting. No-op when the key is absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM settings WHERE key = ?", params![key])
            .context("Failed to delete setting")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Typed accessors
    // -----------------------------------------------------------------------

    /// Load the stored client credentials.
    ///
    /// Returns `None` unless both the client ID and secret are present and
    /// non-empty.
    pub fn client_credentials(&self) -> Result<Option<ClientCredentials>> {
        let client_id = self.get(KEY_CLIENT_ID)?.unwrap_or_default();
        let client_secret = self.get(KEY_CLIENT_SECRET)?.unwrap_or_default();

        if client_id.is_empty() || client_secret.is_empty() {
            return Ok(None);
        }

        Ok(Some(ClientCredentials {
            client_id,
            client_secret,
        }))
    }

    /// Store the client credentials.
    pub fn save_client_credentials(&self, credentials: &ClientCredentials) -> Result<()> {
        self.set(KEY_CLIENT_ID, &credentials.client_id)?;
        self.set(KEY_CLIENT_SECRET, &credentials.client_secret)?;
        Ok(())
    }

    /// Load the stored token pair.
    ///
    /// Returns `None` unless both tokens are present and non-empty; a
    /// half-written pair is treated as absent. An unparsable expiry is
    /// tolerated and read back as `None`.
    pub fn token_pair(&self) -> Result<Option<TokenPair>> {
        let access_token = self.get(KEY_ACCESS_TOKEN)?.unwrap_or_default();
        let refresh_token = self.get(KEY_REFRESH_TOKEN)?.unwrap_or_default();

        if access_token.is_empty() || refresh_token.is_empty() {
            return Ok(None);
        }

        let expires_at = match self.get(KEY_ACCESS_TOKEN_EXPIRES_AT)? {
            None => None,
            Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(parsed) => Some(parsed.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!("Ignoring unparsable token expiry {:?}: {}", raw, e);
                    None
                }
            },
        };

        Ok(Some(TokenPair {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    /// Persist a token pair atomically.
    ///
    /// Both tokens (and the expiry) are written in a single transaction so
    /// a failure leaves the previous pair intact — the store never holds a
    /// partial pair.
    pub fn save_token_pair(&self, pair: &TokenPair) -> Result<()> {
        let mut conn = self.connect()?;

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;

        for (key, value) in [
            (KEY_ACCESS_TOKEN, pair.access_token.as_str()),
            (KEY_REFRESH_TOKEN, pair.refresh_token.as_str()),
        ] {
            tx.execute(
                "INSERT INTO settings (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .context("Failed to write token")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;
        }

        match &pair.expires_at {
            Some(expires_at) => {
                tx.execute(
                    "INSERT INTO settings (key, value) VALUES (?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![KEY_ACCESS_TOKEN_EXPIRES_AT, expires_at.to_rfc3339()],
                )
                .context("Failed to write token expiry")
                .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;
            }
            None => {
                tx.execute(
                    "DELETE FROM settings WHERE key = ?",
                    params![KEY_ACCESS_TOKEN_EXPIRES_AT],
                )
                .context("Failed to clear token expiry")
                .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;
            }
        }

        tx.commit()
            .context("Failed to commit token pair")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Remove the stored tokens, returning the lifecycle to the
    /// awaiting-authorization state. Client credentials are untouched.
    pub fn clear_tokens(&self) -> Result<()> {
        let mut conn = self.connect()?;

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;

        for key in [
            KEY_ACCESS_TOKEN,
            KEY_REFRESH_TOKEN,
            KEY_ACCESS_TOKEN_EXPIRES_AT,
        ] {
            tx.execute("DELETE FROM settings WHERE key = ?", params![key])
                .context("Failed to delete token setting")
                .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;
        }

        tx.commit()
            .context("Failed to commit token removal")
            .map_err(|e| PhotoEmbedError::Storage(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serial_test::serial;

    fn temp_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = CredentialStore::open_at(dir.path().join("settings.db")).expect("open store");
        (dir, store)
    }

    fn sample_pair(expires_at: Option<DateTime<Utc>>) -> TokenPair {
        TokenPair {
            access_token: "access_abc".to_string(),
            refresh_token: "refresh_xyz".to_string(),
            expires_at,
        }
    }

    // -----------------------------------------------------------------------
    // TokenPair::is_expired
    // -----------------------------------------------------------------------

    #[test]
    fn test_token_pair_expired_when_past_expiry() {
        let pair = sample_pair(Some(Utc::now() - Duration::seconds(1)));
        assert!(pair.is_expired());
    }

    #[test]
    fn test_token_pair_expired_within_buffer_window() {
        // 30 seconds in the future is still within the 60-second buffer.
        let pair = sample_pair(Some(Utc::now() + Duration::seconds(30)));
        assert!(pair.is_expired());
    }

    #[test]
    fn test_token_pair_not_expired_when_future_expiry() {
        let pair = sample_pair(Some(Utc::now() + Duration::hours(1)));
        assert!(!pair.is_expired());
    }

    #[test]
    fn test_token_pair_not_expired_when_no_expiry() {
        let pair = sample_pair(None);
        assert!(!pair.is_expired());
    }

    // -----------------------------------------------------------------------
    // Key-value contract
    // -----------------------------------------------------------------------

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (_dir, store) = temp_store();
        assert!(store.get("never_written").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let (_dir, store) = temp_store();
        store.set("client_id", "my-client").unwrap();
        assert_eq!(store.get("client_id").unwrap().as_deref(), Some("my-client"));
    }

    #[test]
    fn test_set_overwrites_previous_value() {
        let (_dir, store) = temp_store();
        store.set("client_id", "first").unwrap();
        store.set("client_id", "second").unwrap();
        assert_eq!(store.get("client_id").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = temp_store();
        store.set("client_id", "value").unwrap();
        store.delete("client_id").unwrap();
        store.delete("client_id").unwrap();
        assert!(store.get("client_id").unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_new_honors_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.db");
        std::env::set_var("PHOTOEMBED_SETTINGS_DB", &path);

        let result = CredentialStore::new();
        std::env::remove_var("PHOTOEMBED_SETTINGS_DB");

        let store = result.expect("store must open at override path");
        store.set("client_id", "abc").unwrap();
        assert!(path.exists());
    }

    // -----------------------------------------------------------------------
    // Typed accessors
    // -----------------------------------------------------------------------

    #[test]
    fn test_client_credentials_absent_until_both_set() {
        let (_dir, store) = temp_store();
        assert!(store.client_credentials().unwrap().is_none());

        store.set(KEY_CLIENT_ID, "id-only").unwrap();
        assert!(store.client_credentials().unwrap().is_none());

        store.set(KEY_CLIENT_SECRET, "secret").unwrap();
        let credentials = store.client_credentials().unwrap().unwrap();
        assert_eq!(credentials.client_id, "id-only");
        assert_eq!(credentials.client_secret, "secret");
    }

    #[test]
    fn test_token_pair_absent_when_only_access_token_present() {
        let (_dir, store) = temp_store();
        store.set(KEY_ACCESS_TOKEN, "access").unwrap();
        assert!(store.token_pair().unwrap().is_none());
    }

    #[test]
    fn test_save_token_pair_round_trips_through_fresh_handle() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("settings.db");

        let pair = sample_pair(Some(
            DateTime::from_timestamp(1_800_000_000, 0).expect("valid timestamp"),
        ));

        {
            let store = CredentialStore::open_at(&db_path).unwrap();
            store.save_token_pair(&pair).unwrap();
        }

        // A fresh handle over the same file must see the pair (durability).
        let store = CredentialStore::open_at(&db_path).unwrap();
        let loaded = store.token_pair().unwrap().expect("pair must persist");
        assert_eq!(loaded.access_token, pair.access_token);
        assert_eq!(loaded.refresh_token, pair.refresh_token);
        assert_eq!(loaded.expires_at, pair.expires_at);
    }

    #[test]
    fn test_save_token_pair_without_expiry_clears_old_expiry() {
        let (_dir, store) = temp_store();
        store
            .save_token_pair(&sample_pair(Some(Utc::now() + Duration::hours(1))))
            .unwrap();
        store.save_token_pair(&sample_pair(None)).unwrap();

        let loaded = store.token_pair().unwrap().unwrap();
        assert!(loaded.expires_at.is_none());
        assert!(store.get(KEY_ACCESS_TOKEN_EXPIRES_AT).unwrap().is_none());
    }

    #[test]
    fn test_unparsable_expiry_is_read_back_as_none() {
        let (_dir, store) = temp_store();
        store.save_token_pair(&sample_pair(None)).unwrap();
        store.set(KEY_ACCESS_TOKEN_EXPIRES_AT, "not-a-timestamp").unwrap();

        let loaded = store.token_pair().unwrap().unwrap();
        assert!(loaded.expires_at.is_none());
    }

    #[test]
    fn test_clear_tokens_preserves_credentials() {
        let (_dir, store) = temp_store();
        store
            .save_client_credentials(&ClientCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            })
            .unwrap();
        store.save_token_pair(&sample_pair(None)).unwrap();

        store.clear_tokens().unwrap();

        assert!(store.token_pair().unwrap().is_none());
        assert!(store.client_credentials().unwrap().is_some());
    }
}
