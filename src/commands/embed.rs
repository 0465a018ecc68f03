//! Embed command handler
//!
//! Renders the album gallery to stdout or a file. The embed surface never
//! fails: fetch problems surface as an inline human-readable string in
//! place of the markup, and the command still exits successfully.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;

use super::build_service;

/// Render an album as an embeddable HTML gallery fragment.
pub async fn run_embed(config: Config, album_id: String, output: Option<PathBuf>) -> Result<()> {
    let service = build_service(config)?;

    let markup = service.render_embed(&album_id).await;

    match output {
        Some(path) => {
            std::fs::write(&path, &markup)?;
            tracing::info!("gallery written to {}", path.display());
        }
        None => println!("{markup}"),
    }

    Ok(())
}
