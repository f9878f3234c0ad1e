//! Shared helpers for command implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use somnair_core::OpenMeteoClient;
use somnair_service::{Config, ToolSurface};
use somnair_store::Store;

/// Load the configuration file, falling back to defaults when none exists.
///
/// An explicit `path` must exist and parse. CLI overrides are applied on top
/// and the result is validated.
pub fn load_config(path: Option<&Path>, database: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default().unwrap_or_default(),
    };
    if let Some(database) = database {
        config.storage.path = database;
    }
    config.validate()?;
    Ok(config)
}

/// Open the configured database.
pub fn open_store(config: &Config) -> Result<Store> {
    let path = &config.storage.path;
    debug!("Using database {}", path.display());
    Store::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Build the tool surface over the configured store and lookup.
pub fn open_tools(config: &Config) -> Result<ToolSurface> {
    let store = open_store(config)?;
    let lookup = OpenMeteoClient::new(config.lookup.clone())
        .context("Invalid air-quality lookup configuration")?;
    Ok(ToolSurface::new(Arc::new(store), Arc::new(lookup)).with_defaults(config.defaults))
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
