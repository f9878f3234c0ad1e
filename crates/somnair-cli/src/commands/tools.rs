//! Tools command implementation.

use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use somnair_service::tool_declarations;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_tools_text};
use crate::util::write_output;

/// Print the tool declarations an agent registers.
pub fn cmd_tools(format: OutputFormat, output: Option<&PathBuf>, opts: &FormatOptions) -> Result<()> {
    let declarations = tool_declarations();

    let content = match format {
        OutputFormat::Json => opts.as_json(&json!({ "tools": declarations }))?,
        OutputFormat::Text => format_tools_text(&declarations, opts),
    };

    write_output(output, &content)?;
    Ok(())
}
