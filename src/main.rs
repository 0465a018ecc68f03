//! photoembed - Photo album embedding CLI
//!
#![doc = "photoembed - Photo album embedding CLI"]
#![doc = "Main entry point for the photoembed application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use photoembed::cli::{Cli, Commands, SettingsCommand};
use photoembed::commands;
use photoembed::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Auth { code, redirect_uri } => {
            tracing::info!("Starting authorization flow");
            if code.is_some() {
                tracing::debug!("Exchanging operator-supplied authorization code");
            }
            commands::auth::run_auth(config, code, redirect_uri).await?;
            Ok(())
        }
        Commands::Embed { album_id, output } => {
            tracing::info!("Rendering album embed");
            commands::embed::run_embed(config, album_id, output).await?;
            Ok(())
        }
        Commands::Status => {
            commands::status::run_status(config)?;
            Ok(())
        }
        Commands::Settings { command } => match command {
            SettingsCommand::SetCredentials {
                client_id,
                client_secret,
            } => {
                commands::settings::set_credentials(config, client_id, client_secret)?;
                Ok(())
            }
            SettingsCommand::ClearTokens => {
                commands::settings::clear_tokens(config)?;
                Ok(())
            }
        },
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("photoembed=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
