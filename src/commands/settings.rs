//! Settings command handlers
//!
//! Stores the OAuth2 client credentials and clears tokens. Credentials
//! are set once by the operator and only change when re-issued by the
//! photo service.

use crate::config::Config;
use crate::error::Result;
use crate::store::{ClientCredentials, CredentialStore};

/// Store the OAuth2 client credentials.
pub fn set_credentials(config: Config, client_id: String, client_secret: String) -> Result<()> {
    let store = CredentialStore::from_config(&config.store)?;

    store.save_client_credentials(&ClientCredentials {
        client_id,
        client_secret,
    })?;

    println!("Client credentials stored. Run `photoembed auth` to authorize.");
    Ok(())
}

/// Remove stored tokens, returning to the unauthorized state.
pub fn clear_tokens(config: Config) -> Result<()> {
    let store = CredentialStore::from_config(&config.store)?;
    store.clear_tokens()?;

    println!("Stored tokens removed.");
    Ok(())
}
