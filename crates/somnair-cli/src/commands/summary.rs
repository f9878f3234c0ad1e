//! Summary command implementation.

use std::path::PathBuf;

use anyhow::Result;

use somnair_service::{DefaultsConfig, SummaryArgs, ToolSurface};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_summary_text};
use crate::util::write_output;

pub fn cmd_summary(
    tools: &ToolSurface,
    args: SummaryArgs,
    defaults: DefaultsConfig,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let summary = tools.summarize(&args)?;

    let content = match format {
        OutputFormat::Json => opts.as_json(&summary)?,
        OutputFormat::Text => {
            let days = args.days.unwrap_or(defaults.summary_days);
            format_summary_text(&summary, days, opts)
        }
    };

    write_output(output, &content)?;
    Ok(())
}
