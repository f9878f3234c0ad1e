//! Database schema.

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
///
/// Safe to call on an already-initialized database: every statement is
/// guarded by `IF NOT EXISTS`. An unversioned `sleep_logs` table is
/// adopted and its naive timestamps rewritten into the stored layout.
pub fn initialize(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        create_schema_v1(conn)?;
        let rewritten = normalize_legacy_timestamps(conn)?;
        if rewritten > 0 {
            info!("Normalized {} legacy timestamps to UTC layout", rewritten);
        }
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

/// Get the current schema version.
pub(crate) fn get_schema_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
        [version],
    )?;
    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- One row per night: PM2.5 in µg/m³, sleep duration in hours
        CREATE TABLE IF NOT EXISTS sleep_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ts TEXT NOT NULL,
            pm25 REAL NOT NULL,
            sleep_dur_h REAL NOT NULL,
            kualitas TEXT,
            catatan TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_sleep_logs_ts ON sleep_logs(ts);
        "#,
    )?;

    Ok(())
}

/// Rewrite `YYYY-MM-DDTHH:MM:SS[.ffffff]` values (no zone) as
/// `YYYY-MM-DDTHH:MM:SSZ`, reading them as UTC.
///
/// Values in any other shape are left alone.
fn normalize_legacy_timestamps(conn: &Connection) -> Result<usize> {
    let rewritten = conn.execute(
        "UPDATE sleep_logs
         SET ts = substr(ts, 1, 19) || 'Z'
         WHERE ts GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T[0-9][0-9]:[0-9][0-9]:[0-9][0-9]*'
           AND (length(ts) = 19 OR substr(ts, 20, 1) = '.')",
        [],
    )?;
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_initialize_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let tables = table_names(&conn);
        assert!(tables.contains(&"sleep_logs".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_schema_version_tracking() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        initialize(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_initialize_twice_keeps_single_schema() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap();

        let tables = table_names(&conn);
        let logs = tables.iter().filter(|t| *t == "sleep_logs").count();
        assert_eq!(logs, 1);

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_adopts_table_created_without_version() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sleep_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts TEXT NOT NULL,
                pm25 REAL NOT NULL,
                sleep_dur_h REAL NOT NULL,
                kualitas TEXT,
                catatan TEXT
            );
            INSERT INTO sleep_logs (ts, pm25, sleep_dur_h) VALUES ('2025-01-01T00:00:00Z', 9.0, 7.5);",
        )
        .unwrap();

        initialize(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM sleep_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_adoption_normalizes_naive_timestamps() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sleep_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts TEXT NOT NULL,
                pm25 REAL NOT NULL,
                sleep_dur_h REAL NOT NULL,
                kualitas TEXT,
                catatan TEXT
            );
            INSERT INTO sleep_logs (ts, pm25, sleep_dur_h) VALUES ('2025-01-01T10:00:00', 9.0, 7.5);
            INSERT INTO sleep_logs (ts, pm25, sleep_dur_h) VALUES ('2025-01-02T22:30:15.123456', 20.0, 6.0);
            INSERT INTO sleep_logs (ts, pm25, sleep_dur_h) VALUES ('2025-01-03T08:00:00Z', 11.0, 8.0);",
        )
        .unwrap();

        initialize(&conn).unwrap();

        let stamps: Vec<String> = conn
            .prepare("SELECT ts FROM sleep_logs ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            stamps,
            [
                "2025-01-01T10:00:00Z",
                "2025-01-02T22:30:15Z",
                "2025-01-03T08:00:00Z"
            ]
        );
    }
}
