//! Air command implementation.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use somnair_service::{LookupArgs, ToolSurface};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_report_text};
use crate::util::write_output;

pub async fn cmd_air(
    tools: &ToolSurface,
    location: &[String],
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let args = LookupArgs::new(location.join(" "))?;
    if !quiet {
        info!("Looking up current PM2.5 for {}", args.location);
    }
    let report = tools.lookup_current(&args).await?;

    let content = match format {
        OutputFormat::Json => opts.as_json(&report)?,
        OutputFormat::Text => format_report_text(&report, opts),
    };

    write_output(output, &content)?;
    Ok(())
}
