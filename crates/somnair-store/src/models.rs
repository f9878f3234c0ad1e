//! Data models for stored observations.

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use somnair_types::{Pm25Zone, SleepSample, ValidationResult};

use crate::error::{Error, Result};

/// Text layout of every stored timestamp: UTC, second precision.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Naive local-time layout left by older installs, optionally with
/// fractional seconds. Read as UTC.
const LEGACY_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);

/// Format a moment in the stored timestamp layout.
pub(crate) fn format_timestamp(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    // The layout only contains numeric components, which always format.
    utc.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

/// Parse a stored timestamp.
///
/// Rows without a zone marker (`2025-01-01T10:00:00`, possibly with
/// fractional seconds) are taken as UTC and truncated to the second.
pub(crate) fn parse_timestamp(raw: &str) -> Result<OffsetDateTime> {
    PrimitiveDateTime::parse(raw, TIMESTAMP_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(raw, LEGACY_TIMESTAMP_FORMAT))
        .map(|dt| dt.replace_nanosecond(0).unwrap_or(dt).assume_utc())
        .map_err(|e| Error::InvalidTimestamp(format!("{raw}: {e}")))
}

/// An observation waiting to be appended.
///
/// Id and timestamp are assigned by the store; callers cannot supply them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewObservation {
    /// PM2.5 concentration in µg/m³.
    pub pm25: f64,
    /// Sleep duration in hours.
    pub sleep_duration_hours: f64,
    /// Free-text quality label such as "baik" or "buruk".
    #[serde(default)]
    pub quality_label: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl NewObservation {
    /// Create an observation without label or note.
    pub fn new(pm25: f64, sleep_duration_hours: f64) -> Self {
        Self {
            pm25,
            sleep_duration_hours,
            quality_label: None,
            note: None,
        }
    }

    /// Set the quality label. Blank labels are dropped.
    pub fn quality_label(mut self, label: impl Into<String>) -> Self {
        self.quality_label = non_blank(label.into());
        self
    }

    /// Set the note. Blank notes are dropped.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = non_blank(note.into());
        self
    }

    /// Validate the numeric fields.
    pub fn sample(&self) -> ValidationResult<SleepSample> {
        SleepSample::new(self.pm25, self.sleep_duration_hours)
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Ordered row form of an observation:
/// `(timestamp, pm25, sleep_duration_hours, quality_label, note)`.
pub type ObservationRow = (String, f64, f64, Option<String>, Option<String>);

/// An observation stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Database row ID, increasing with insertion order.
    pub id: i64,
    /// When the observation was recorded (UTC, second precision).
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// PM2.5 concentration in µg/m³.
    pub pm25: f64,
    /// Sleep duration in hours.
    pub sleep_duration_hours: f64,
    /// Free-text quality label.
    pub quality_label: Option<String>,
    /// Free-text note.
    pub note: Option<String>,
}

impl Observation {
    /// Zone of the recorded concentration.
    pub fn zone(&self) -> Pm25Zone {
        Pm25Zone::from_pm25(self.pm25)
    }

    /// Timestamp in the stored text layout.
    pub fn timestamp_text(&self) -> String {
        format_timestamp(self.timestamp)
    }

    /// Convert to the ordered row form.
    pub fn to_row(&self) -> ObservationRow {
        (
            self.timestamp_text(),
            self.pm25,
            self.sleep_duration_hours,
            self.quality_label.clone(),
            self.note.clone(),
        )
    }
}

/// Averages over a window of observations.
///
/// Both means are 0.0 when `count` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationStats {
    /// Mean PM2.5, rounded to one decimal.
    pub avg_pm: f64,
    /// Mean sleep duration in hours, rounded to one decimal.
    pub avg_duration_hours: f64,
    /// Number of observations in the window.
    pub count: u64,
}
