//! Authorization command handler
//!
//! Runs the interactive browser flow by default; with `--code` the
//! exchange happens directly, for operators completing the flow from a
//! redirect they handled themselves.

use crate::auth::flow::describe_expiry;
use crate::config::Config;
use crate::error::Result;

use super::build_service;

/// Authorize access to the photo service and persist the token pair.
pub async fn run_auth(
    config: Config,
    code: Option<String>,
    redirect_uri: Option<String>,
) -> Result<()> {
    let service = build_service(config)?;

    let pair = match code {
        Some(code) => {
            let redirect_uri =
                redirect_uri.unwrap_or_else(|| service.default_redirect_uri());
            service.complete_authorization(&code, &redirect_uri).await?
        }
        None => service.authorize_interactive().await?,
    };

    println!(
        "Authorization successful; access token {}.",
        describe_expiry(pair.expires_at)
    );
    Ok(())
}
