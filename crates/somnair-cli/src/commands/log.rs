//! Log command implementation.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use somnair_service::{LogArgs, ToolSurface};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_receipt_text};
use crate::util::write_output;

/// One night as given on the command line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub pm25: f64,
    pub hours: f64,
    pub quality: Option<String>,
    pub note: Option<String>,
}

pub fn cmd_log(
    tools: &ToolSurface,
    entry: LogEntry,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let receipt = tools.log(&LogArgs {
        pm25: entry.pm25,
        sleep_duration_hours: entry.hours,
        quality_label: entry.quality,
        note: entry.note,
    })?;
    info!("Saved observation {}", receipt.id);

    let content = match format {
        OutputFormat::Json => opts.as_json(&receipt)?,
        OutputFormat::Text => format_receipt_text(&receipt),
    };

    write_output(output, &content)?;
    Ok(())
}
