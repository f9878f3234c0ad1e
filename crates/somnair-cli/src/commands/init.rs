//! Init command implementation.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use somnair_service::Config;

use crate::cli::OutputFormat;
use crate::format::FormatOptions;
use crate::util::{open_store, write_output};

/// Create the database file and schema. Safe to repeat.
pub fn cmd_init(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let store = open_store(config)?;
    let message = store.initialize()?;

    let content = match format {
        OutputFormat::Json => opts.as_json(&json!({
            "message": message,
            "path": config.storage.path,
        }))?,
        OutputFormat::Text => format!("{}\n", message),
    };

    write_output(output, &content)?;
    Ok(())
}
