//! Main store implementation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use somnair_types::round_tenth;

use crate::error::{Error, Result};
use crate::models::{
    NewObservation, Observation, ObservationStats, format_timestamp, parse_timestamp,
};
use crate::queries::ObservationQuery;
use crate::schema;

/// Column header used by [`Store::export_csv`].
const CSV_HEADER: [&str; 5] = ["ts", "pm25", "sleep_dur_h", "kualitas", "catatan"];

/// Longest summary window; anything larger already covers every possible row.
const MAX_WINDOW_DAYS: i64 = 1_000_000;

/// SQLite-based, append-only store for sleep and PM2.5 observations.
///
/// The connection sits behind a mutex that is held for a single statement
/// at a time, so one `Store` can be shared across threads via `Arc`.
pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        // WAL lets readers proceed while a writer appends
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Path of the backing database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Ensure the schema exists and return a confirmation message.
    ///
    /// Calling this on an initialized store is a no-op that still succeeds.
    pub fn initialize(&self) -> Result<String> {
        schema::initialize(&self.conn())?;
        let location = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        Ok(format!("SQLite initialized at {}", location))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves SQLite itself consistent.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Observation operations
impl Store {
    /// Append one observation, stamped with the current time.
    ///
    /// Fails with [`Error::Validation`] when either number is negative or
    /// not finite; nothing is written in that case.
    pub fn append(&self, observation: &NewObservation) -> Result<Observation> {
        self.append_at(observation, OffsetDateTime::now_utc())
    }

    fn append_at(&self, observation: &NewObservation, at: OffsetDateTime) -> Result<Observation> {
        let sample = observation.sample()?;
        let ts = format_timestamp(at);

        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO sleep_logs (ts, pm25, sleep_dur_h, kualitas, catatan)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    ts,
                    sample.pm25,
                    sample.sleep_duration_hours,
                    observation.quality_label,
                    observation.note,
                ],
            )?;
            conn.last_insert_rowid()
        };

        info!(
            "Logged observation {}: pm25={} sleep={}h",
            id, sample.pm25, sample.sleep_duration_hours
        );

        Ok(Observation {
            id,
            timestamp: parse_timestamp(&ts)?,
            pm25: sample.pm25,
            sleep_duration_hours: sample.sleep_duration_hours,
            quality_label: observation.quality_label.clone(),
            note: observation.note.clone(),
        })
    }

    /// The `n` most recently appended observations, newest first.
    ///
    /// Returns an empty list when `n <= 0`.
    pub fn recent(&self, n: i64) -> Result<Vec<Observation>> {
        if n <= 0 {
            return Ok(Vec::new());
        }
        let limit = u32::try_from(n).unwrap_or(u32::MAX);
        self.query_observations(&ObservationQuery::new().limit(limit))
    }

    /// Query observations with filters.
    pub fn query_observations(&self, query: &ObservationQuery) -> Result<Vec<Observation>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let raw = {
            let conn = self.conn();
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok(RawObservation {
                    id: row.get(0)?,
                    ts: row.get(1)?,
                    pm25: row.get(2)?,
                    sleep_duration_hours: row.get(3)?,
                    quality_label: row.get(4)?,
                    note: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?
        };

        raw.into_iter().map(RawObservation::into_observation).collect()
    }

    /// Averages over observations recorded in the last `days` days.
    ///
    /// The window starts at `now (UTC) - days`. A window of zero or fewer
    /// days contains nothing.
    pub fn summarize(&self, days: i64) -> Result<ObservationStats> {
        self.summarize_at(days, OffsetDateTime::now_utc())
    }

    fn summarize_at(&self, days: i64, now: OffsetDateTime) -> Result<ObservationStats> {
        if days <= 0 {
            return Ok(ObservationStats::default());
        }

        let cutoff = now
            .checked_sub(Duration::days(days.min(MAX_WINDOW_DAYS)))
            .map(format_timestamp)
            .unwrap_or_default();

        let (avg_pm, avg_hours, count): (Option<f64>, Option<f64>, i64) =
            self.conn().query_row(
                "SELECT AVG(pm25), AVG(sleep_dur_h), COUNT(*) FROM sleep_logs WHERE ts >= ?1",
                [&cutoff],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        debug!("Summary since {}: {} observations", cutoff, count);

        Ok(ObservationStats {
            avg_pm: round_tenth(avg_pm.unwrap_or(0.0)),
            avg_duration_hours: round_tenth(avg_hours.unwrap_or(0.0)),
            count: count.max(0) as u64,
        })
    }

    /// Count all stored observations.
    pub fn count_observations(&self) -> Result<u64> {
        let count: i64 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM sleep_logs", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Write every observation, oldest first, as CSV.
    ///
    /// Returns the number of data rows written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let observations = self.query_observations(&ObservationQuery::new().oldest_first())?;

        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for obs in &observations {
            csv.serialize(obs.to_row())?;
        }
        csv.flush()?;

        info!("Exported {} observations", observations.len());
        Ok(observations.len())
    }
}

/// Row as read from SQLite, before timestamp parsing.
struct RawObservation {
    id: i64,
    ts: String,
    pm25: f64,
    sleep_duration_hours: f64,
    quality_label: Option<String>,
    note: Option<String>,
}

impl RawObservation {
    fn into_observation(self) -> Result<Observation> {
        Ok(Observation {
            id: self.id,
            timestamp: parse_timestamp(&self.ts)?,
            pm25: self.pm25,
            sleep_duration_hours: self.sleep_duration_hours,
            quality_label: self.quality_label,
            note: self.note,
        })
    }
}
