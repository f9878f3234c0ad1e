//! Tool surface and HTTP API for the Somnair PM2.5 and sleep coach.
//!
//! This crate provides:
//! - The [`ToolSurface`]: the four operations an external conversational
//!   agent calls (`analyze`, `log`, `summarize`, `lookup_current`)
//! - Typed, coercing tool arguments ([`args`])
//! - The single-user conversation [`session`] context
//! - A REST API exposing the tools and stored observations
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/tools` - Tool declarations (JSON schema)
//! - `POST /api/tools/{name}` - Run a tool, answer with an envelope
//! - `GET /api/observations` - Query stored observations
//! - `GET|POST|DELETE /api/session` - Session lifecycle
//! - `POST /api/session/messages` - Append to the conversation
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/somnair/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [storage]
//! path = "database/sleep_data.db"
//!
//! [lookup]
//! geocoding_url = "https://geocoding-api.open-meteo.com"
//! air_quality_url = "https://air-quality-api.open-meteo.com"
//! timeout_secs = 10
//! language = "id"
//!
//! [defaults]
//! summary_days = 7
//! recent_count = 10
//! ```

pub mod api;
pub mod args;
pub mod config;
pub mod session;
pub mod state;
pub mod tools;

pub use args::{AnalyzeArgs, LogArgs, LookupArgs, SummaryArgs};
pub use config::{
    Config, ConfigError, DefaultsConfig, FieldError, ServerConfig, StorageConfig,
    default_config_path,
};
pub use session::{ChatMessage, MAX_HISTORY, Role, SessionChange, SessionContext, SessionSlot};
pub use state::AppState;
pub use tools::{
    LogReceipt, SleepSummary, ToolDeclaration, ToolError, ToolResult, ToolSurface,
    tool_declarations,
};
