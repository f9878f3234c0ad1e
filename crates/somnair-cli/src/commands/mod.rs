//! Command implementations for the CLI.

mod air;
mod analyze;
mod export;
mod init;
mod log;
mod summary;
mod tools;

pub use air::cmd_air;
pub use analyze::cmd_analyze;
pub use export::cmd_export;
pub use init::cmd_init;
pub use log::{LogEntry, cmd_log};
pub use summary::cmd_summary;
pub use tools::cmd_tools;
