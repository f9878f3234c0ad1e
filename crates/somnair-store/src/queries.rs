//! Query builder for stored observations.
//!
//! [`ObservationQuery`] follows the builder pattern: every filter is
//! optional and methods can be chained in any order.
//!
//! # Example
//!
//! ```
//! use somnair_store::{ObservationQuery, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let last_week = OffsetDateTime::now_utc() - Duration::days(7);
//!
//! let query = ObservationQuery::new().since(last_week).limit(20);
//! let observations = store.query_observations(&query)?;
//! assert!(observations.is_empty());
//! # Ok::<(), somnair_store::Error>(())
//! ```

use time::OffsetDateTime;

use crate::models::format_timestamp;

/// Fluent query builder for observations.
///
/// By default, queries return results newest first (by id, which follows
/// insertion order).
#[derive(Debug, Default, Clone)]
pub struct ObservationQuery {
    /// Only observations recorded at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Only observations recorded at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by id descending (newest first).
    pub newest_first: bool,
}

impl ObservationQuery {
    /// Create a new query: no filters, no limit, newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter to observations recorded at or after this time.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to observations recorded at or before this time.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first N results.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order results oldest first.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the SQL WHERE clause and parameters.
    ///
    /// Time bounds compare the `ts` text column; the stored layout is
    /// fixed-width UTC, so text order is time order.
    pub(crate) fn build_where(&self) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(since) = self.since {
            conditions.push("ts >= ?");
            params.push(format_timestamp(since));
        }

        if let Some(until) = self.until {
            conditions.push("ts <= ?");
            params.push(format_timestamp(until));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    /// Build the full SQL query.
    pub(crate) fn build_sql(&self) -> String {
        let (where_clause, _) = self.build_where();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, ts, pm25, sleep_dur_h, kualitas, catatan \
             FROM sleep_logs {} ORDER BY id {}",
            where_clause, order
        );

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset))
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        sql
    }
}
