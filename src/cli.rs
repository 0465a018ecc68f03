//! Command-line interface definition for photoembed
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authorization, album embedding, status, and
//! stored settings management.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// photoembed - Photo album embedding CLI
///
/// Authorize access to a remote photo-hosting service via OAuth2 and
/// render named albums as embeddable HTML galleries.
#[derive(Parser, Debug, Clone)]
#[command(name = "photoembed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the settings database (overrides config file)
    #[arg(long, env = "PHOTOEMBED_SETTINGS_DB")]
    pub settings_db: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for photoembed
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Authorize access to the photo service
    Auth {
        /// Exchange a known authorization code instead of running the
        /// interactive browser flow
        #[arg(long)]
        code: Option<String>,

        /// Redirect URI used during the exchange
        ///
        /// Only meaningful together with `--code`; must match the URI the
        /// code was issued for. Defaults to the local callback URI.
        #[arg(long)]
        redirect_uri: Option<String>,
    },

    /// Render an album as an embeddable HTML gallery
    Embed {
        /// Album identifier in the remote service
        #[arg(short, long, default_value = "")]
        album_id: String,

        /// Write the markup to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration and authorization status
    Status,

    /// Manage stored settings
    Settings {
        /// Settings subcommand
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Stored settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Store the OAuth2 client credentials
    SetCredentials {
        /// OAuth2 client ID issued by the photo service
        #[arg(long)]
        client_id: String,

        /// OAuth2 client secret issued by the photo service
        #[arg(long)]
        client_secret: String,
    },

    /// Remove stored tokens, returning to the unauthorized state
    ClearTokens,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
