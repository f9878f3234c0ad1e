//! Analyze command implementation.
//!
//! Scoring is pure, so this command never opens the database.

use std::path::PathBuf;

use anyhow::Result;

use somnair_core::RiskEvaluator;
use somnair_service::AnalyzeArgs;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_assessment_text};
use crate::util::write_output;

pub fn cmd_analyze(
    evaluator: &RiskEvaluator,
    pm25: f64,
    hours: f64,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let sample = AnalyzeArgs {
        pm25,
        sleep_duration_hours: hours,
    }
    .sample()?;
    let assessment = evaluator.evaluate_sample(&sample);

    let content = match format {
        OutputFormat::Json => opts.as_json(&assessment)?,
        OutputFormat::Text => format_assessment_text(&assessment, opts),
    };

    write_output(output, &content)?;
    Ok(())
}
