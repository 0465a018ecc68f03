//! Status command handler
//!
//! Reports where the authorization lifecycle currently stands:
//! unconfigured, awaiting authorization, or authorized (with expiry).

use colored::Colorize;

use crate::auth::flow::describe_expiry;
use crate::config::Config;
use crate::error::Result;
use crate::store::CredentialStore;

/// Show configuration and authorization status.
pub fn run_status(config: Config) -> Result<()> {
    let store = CredentialStore::from_config(&config.store)?;

    println!("Service endpoints:");
    println!("  authorization: {}", config.service.authorization_endpoint);
    println!("  token:         {}", config.service.token_endpoint);
    println!("  media search:  {}", config.service.media_search_endpoint);
    println!();

    let credentials = store.client_credentials()?;
    let tokens = store.token_pair()?;

    match (&credentials, &tokens) {
        (None, _) => {
            println!("State: {}", "unconfigured".red());
            println!(
                "Store client credentials with `photoembed settings set-credentials`."
            );
        }
        (Some(_), None) => {
            println!("State: {}", "awaiting authorization".yellow());
            println!("Run `photoembed auth` to authorize access.");
        }
        (Some(_), Some(pair)) => {
            if pair.is_expired() {
                println!("State: {}", "authorized (token expired)".yellow());
                println!("The access token will be refreshed on the next render.");
            } else {
                println!("State: {}", "authorized".green());
            }
            println!("Access token {}.", describe_expiry(pair.expires_at));
        }
    }

    Ok(())
}
