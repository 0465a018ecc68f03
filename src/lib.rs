//! photoembed - Photo album embedding library
//!
//! This library lets an operator authorize access to a remote
//! photo-hosting service via the OAuth2 authorization-code flow and render
//! named albums as safe, embeddable HTML galleries.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `store`: Durable key-value settings (credentials and tokens)
//! - `auth`: Authorization URL, code exchange, refresh, redirect callback
//! - `media`: Authenticated album media retrieval
//! - `render`: HTML gallery rendering with attribute escaping
//! - `service`: High-level orchestrator tying the above together
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use photoembed::{AlbumService, Config, CredentialStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let store = CredentialStore::new()?;
//!     let service = AlbumService::new(config, store)?;
//!
//!     // Returns markup, or an inline failure string -- never an error.
//!     let markup = service.render_embed("album1").await;
//!     println!("{markup}");
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod media;
pub mod render;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{PhotoEmbedError, Result};
pub use media::{AlbumMediaFetcher, MediaItem};
pub use render::render_gallery;
pub use service::AlbumService;
pub use store::{ClientCredentials, CredentialStore, TokenPair};
