//! Trait abstraction over air-quality providers.
//!
//! [`AirQualitySource`] lets the tool surface work with the live
//! [`crate::OpenMeteoClient`] and with [`crate::MockAirQuality`] in tests.

use async_trait::async_trait;

use crate::air_quality::AirQualityReport;
use crate::error::Result;

/// A provider of current PM2.5 readings for a named place.
///
/// # Example
///
/// ```
/// use somnair_core::{AirQualitySource, Result};
///
/// async fn describe<S: AirQualitySource + ?Sized>(source: &S, place: &str) -> Result<String> {
///     let report = source.current_pm25(place).await?;
///     Ok(format!("{}: {} µg/m³ ({})", report.location, report.pm25, report.category))
/// }
/// ```
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    /// Resolve `location` and return its current PM2.5 reading.
    ///
    /// Fails with [`crate::LookupError::NotFound`] when the place cannot be
    /// resolved and [`crate::LookupError::DataUnavailable`] when it resolves
    /// without a reading.
    async fn current_pm25(&self, location: &str) -> Result<AirQualityReport>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}
