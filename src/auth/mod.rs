//! OAuth2 authorization-code flow for the remote photo service
//!
//! This module implements the confidential-client authorization code flow
//! used to obtain and refresh the access/refresh token pair:
//!
//! 1. Build the authorization URL shown to the operator
//!    ([`flow::AuthFlow::build_authorization_url`]).
//! 2. Accept the browser redirect on a local listener and extract the
//!    authorization code ([`callback::CallbackListener`]).
//! 3. Exchange the code for tokens ([`flow::AuthFlow::exchange_code`]).
//! 4. Later, exchange the refresh token for a new access token
//!    ([`flow::AuthFlow::refresh_tokens`]).
//!
//! Token persistence is the responsibility of
//! [`CredentialStore`](crate::store::CredentialStore); orchestration lives
//! in [`AlbumService`](crate::service::AlbumService).

pub mod callback;
pub mod flow;

pub use callback::CallbackListener;
pub use flow::AuthFlow;
