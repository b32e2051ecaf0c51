// Library interface for newsdraft modules
// This allows tests and the binaries to import modules

pub mod canonical;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod scraping;
pub mod search;
pub mod server;

use anyhow::{Context, Result};
use common::Config;
use std::path::PathBuf;
use tracing::{error, info};

/// Resolve and load configuration.
///
/// `config.default.toml` in the working directory provides defaults; the override is the
/// `--config` file if given (it must exist), else `config.toml` if present.
pub async fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = match explicit {
        Some(p) => {
            if !p.exists() {
                error!(path = ?p, "specified config file not found");
                anyhow::bail!("Config file not found: {}", p.display());
            }
            Some(p)
        }
        None => {
            let p = PathBuf::from("config.toml");
            if p.exists() { Some(p) } else { None }
        }
    };

    let config = Config::load_with_defaults(
        if default_path.exists() { Some(default_path.as_path()) } else { None },
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;

    info!(default = ?default_path, override_file = ?override_path, "configuration loaded");
    Ok(config)
}
