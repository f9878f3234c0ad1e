//! Command-line interface for the Somnair PM2.5 and sleep coach.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Create the database and schema |
//! | `analyze` | Score a PM2.5 value and a sleep duration |
//! | `log` | Record one night |
//! | `summary` | Averages over recent days plus the latest entries |
//! | `air` | Current outdoor PM2.5 for a place |
//! | `export` | Dump every observation as CSV |
//! | `tools` | List the tool declarations for an agent |
//!
//! The database defaults to `database/sleep_data.db` under the working
//! directory (or the path in `~/.config/somnair/server.toml`). `--database`
//! and the `DB_PATH` environment variable override it.

mod cli;
mod commands;
mod format;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use somnair_core::RiskEvaluator;
use somnair_service::SummaryArgs;

use crate::cli::{Cli, Commands};
use crate::commands::LogEntry;
use crate::format::FormatOptions;
use crate::util::{load_config, open_store, open_tools};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so JSON and CSV on stdout stay parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opts = FormatOptions::new(cli.no_color).with_compact(cli.compact);
    let output = cli.output.as_ref();
    let mut config = load_config(cli.config.as_deref(), cli.database.clone())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&config, cli.format, output, &opts)?,
        Commands::Analyze { pm25, hours } => {
            let evaluator = RiskEvaluator::default();
            commands::cmd_analyze(&evaluator, pm25, hours, cli.format, output, &opts)?;
        }
        Commands::Log {
            pm25,
            hours,
            quality,
            note,
        } => {
            let tools = open_tools(&config)?;
            let entry = LogEntry {
                pm25,
                hours,
                quality,
                note,
            };
            commands::cmd_log(&tools, entry, cli.format, output, &opts)?;
        }
        Commands::Summary { days, recent } => {
            let tools = open_tools(&config)?;
            let args = SummaryArgs {
                days,
                recent_count: recent,
            };
            commands::cmd_summary(&tools, args, config.defaults, cli.format, output, &opts)?;
        }
        Commands::Air { location, timeout } => {
            if let Some(timeout) = timeout {
                config.lookup.timeout_secs = timeout;
                config.validate()?;
            }
            let tools = open_tools(&config)?;
            commands::cmd_air(&tools, &location, cli.format, output, cli.quiet, &opts).await?;
        }
        Commands::Export => {
            let store = open_store(&config)?;
            commands::cmd_export(&store, output)?;
        }
        Commands::Tools => commands::cmd_tools(cli.format, output, &opts)?,
    }

    Ok(())
}
