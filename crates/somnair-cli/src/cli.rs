//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use somnair_store::DB_PATH_ENV;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "somnair")]
#[command(author, version, about = "PM2.5 and sleep coach", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Database path (overrides config)
    #[arg(long, global = true, env = DB_PATH_ENV)]
    pub database: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Use compact JSON output
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database and its schema
    Init,

    /// Score a PM2.5 value and a sleep duration
    Analyze {
        /// PM2.5 in µg/m³
        #[arg(short, long, allow_negative_numbers = true)]
        pm25: f64,

        /// Sleep duration in hours
        #[arg(short = 'H', long, allow_negative_numbers = true)]
        hours: f64,
    },

    /// Record one night
    Log {
        /// PM2.5 in µg/m³
        #[arg(short, long, allow_negative_numbers = true)]
        pm25: f64,

        /// Sleep duration in hours
        #[arg(short = 'H', long, allow_negative_numbers = true)]
        hours: f64,

        /// Free-text quality label (e.g. baik, buruk)
        #[arg(short = 'l', long)]
        quality: Option<String>,

        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Averages over recent days plus the latest entries
    Summary {
        /// Window in days (defaults to config)
        #[arg(short, long, allow_negative_numbers = true)]
        days: Option<i64>,

        /// Number of recent entries (defaults to config)
        #[arg(short, long, allow_negative_numbers = true)]
        recent: Option<i64>,
    },

    /// Current outdoor PM2.5 for a place
    Air {
        /// Place name, e.g. "Jakarta"
        #[arg(required = true, num_args = 1..)]
        location: Vec<String>,

        /// Lookup timeout in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Export every observation as CSV
    Export,

    /// List the tools an agent can call
    Tools,
}
