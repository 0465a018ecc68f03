/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `auth`     — Run the OAuth2 authorization flow
- `embed`    — Render an album as an HTML gallery
- `settings` — Manage stored client credentials and tokens
- `status`   — Show configuration and authorization state

These handlers are intentionally small and use the library components:
the settings store, the authorization flow, and the album service.
*/

pub mod auth;
pub mod embed;
pub mod settings;
pub mod status;

use crate::config::Config;
use crate::error::Result;
use crate::service::AlbumService;
use crate::store::CredentialStore;

/// Builds the album service from the loaded configuration.
pub(crate) fn build_service(config: Config) -> Result<AlbumService> {
    let store = CredentialStore::from_config(&config.store)?;
    AlbumService::new(config, store)
}
