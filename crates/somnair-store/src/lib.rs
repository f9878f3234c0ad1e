//! Local data persistence for sleep and PM2.5 observations.
//!
//! This crate provides an append-only SQLite log of observations, each
//! pairing a PM2.5 concentration with a night's sleep duration.
//!
//! # Features
//!
//! - Append observations; the store assigns id and timestamp
//! - Fetch the N most recent observations
//! - Windowed averages over the last N days
//! - Filtered queries with pagination
//! - CSV export
//!
//! All timestamps are written as UTC, second precision, in the fixed-width
//! form `YYYY-MM-DDTHH:MM:SSZ`, so text comparison in SQL is chronological.
//!
//! # Example
//!
//! ```no_run
//! use somnair_store::{NewObservation, Store};
//!
//! let store = Store::open_default()?;
//! store.append(&NewObservation::new(35.0, 6.0).quality_label("buruk").note("AC bocor"))?;
//!
//! let latest = store.recent(1)?;
//! let stats = store.summarize(7)?;
//! println!("{} logs, avg PM2.5 {}", stats.count, stats.avg_pm);
//! # Ok::<(), somnair_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{NewObservation, Observation, ObservationRow, ObservationStats};
pub use queries::ObservationQuery;
pub use store::Store;

/// Environment variable that overrides the database location in the front-ends.
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Default database path, relative to the working directory.
///
/// `database/sleep_data.db`
pub fn default_db_path() -> std::path::PathBuf {
    std::path::PathBuf::from("database").join("sleep_data.db")
}
