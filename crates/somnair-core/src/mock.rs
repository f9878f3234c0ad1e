//! Mock air-quality source for testing.
//!
//! [`MockAirQuality`] implements [`AirQualitySource`] from canned answers so
//! the tool surface and the HTTP service can be tested without network
//! access.
//!
//! # Features
//!
//! - **Canned reports**: register a reading per place name
//! - **Failure injection**: make a place resolve to "no data" or fail the
//!   whole provider
//! - **Latency simulation**: add an artificial delay to every lookup

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::air_quality::AirQualityReport;
use crate::error::{LookupError, Result};
use crate::traits::AirQualitySource;

#[derive(Debug, Clone)]
enum Canned {
    Report(AirQualityReport),
    NoData(String),
}

/// An in-memory [`AirQualitySource`].
///
/// Unknown places fail with [`LookupError::NotFound`]. Place names match
/// case-insensitively after trimming.
///
/// # Example
///
/// ```
/// use somnair_core::{AirQualitySource, MockAirQuality, Pm25Zone};
///
/// #[tokio::main]
/// async fn main() {
///     let mock = MockAirQuality::new().with_reading("Bandung", -6.9, 107.6, 28.0);
///
///     let report = mock.current_pm25("bandung").await.unwrap();
///     assert_eq!(report.category, Pm25Zone::Moderate);
///     assert!(mock.current_pm25("Atlantis").await.is_err());
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockAirQuality {
    places: RwLock<HashMap<String, Canned>>,
    should_fail: AtomicBool,
    lookup_count: AtomicU32,
    latency_ms: AtomicU64,
}

fn key(location: &str) -> String {
    location.trim().to_lowercase()
}

impl MockAirQuality {
    /// Create an empty mock: every place is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reading for a place. The report label is the given name.
    pub fn with_reading(mut self, location: &str, lat: f64, lon: f64, pm25: f64) -> Self {
        self.places.get_mut().insert(
            key(location),
            Canned::Report(AirQualityReport::new(location, lat, lon, pm25)),
        );
        self
    }

    /// Register a place that resolves but has no PM2.5 value.
    pub fn with_no_data(mut self, location: &str) -> Self {
        self.places
            .get_mut()
            .insert(key(location), Canned::NoData(location.to_string()));
        self
    }

    /// Add or replace a report after construction.
    pub async fn set_report(&self, location: &str, report: AirQualityReport) {
        self.places
            .write()
            .await
            .insert(key(location), Canned::Report(report));
    }

    /// Make every lookup fail as if the provider were down.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Delay every lookup by the given duration.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of lookups performed so far.
    pub fn lookup_count(&self) -> u32 {
        self.lookup_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AirQualitySource for MockAirQuality {
    async fn current_pm25(&self, location: &str) -> Result<AirQualityReport> {
        self.lookup_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(LookupError::Api {
                status: 503,
                message: "mock provider unavailable".to_string(),
            });
        }

        match self.places.read().await.get(&key(location)) {
            Some(Canned::Report(report)) => Ok(report.clone()),
            Some(Canned::NoData(label)) => Err(LookupError::DataUnavailable {
                location: label.clone(),
            }),
            None => Err(LookupError::NotFound {
                location: location.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
