//! Live PM2.5 lookup through the Open-Meteo APIs.
//!
//! A lookup is two GET requests: the geocoding API resolves a free-text
//! place name to coordinates, then the air-quality API returns the PM2.5
//! reading for those coordinates. Neither endpoint needs an API key.
//!
//! # Example
//!
//! ```no_run
//! use somnair_core::{AirQualitySource, LookupConfig, OpenMeteoClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenMeteoClient::new(LookupConfig::default())?;
//!
//! let report = client.current_pm25("Bandung").await?;
//! println!("{}: {} µg/m³ ({})", report.location, report.pm25, report.category);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use somnair_types::{Pm25Zone, round_tenth};

use crate::error::{LookupError, Result};
use crate::traits::AirQualitySource;

/// Provider label attached to every report.
pub const OPEN_METEO_SOURCE: &str = "Open-Meteo (no key)";

/// Default geocoding endpoint.
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

/// Default air-quality endpoint.
pub const DEFAULT_AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com";

/// Lookup client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the geocoding API.
    pub geocoding_url: String,
    /// Base URL of the air-quality API.
    pub air_quality_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Language for geocoded place names.
    pub language: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            air_quality_url: DEFAULT_AIR_QUALITY_URL.to_string(),
            timeout_secs: 10,
            language: "id".to_string(),
        }
    }
}

impl LookupConfig {
    /// Point both endpoints at one base URL. Used with local mock servers.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            geocoding_url: base_url.to_string(),
            air_quality_url: base_url.to_string(),
            ..Default::default()
        }
    }
}

/// Current PM2.5 for a resolved place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    /// Display label: name, region and country when known.
    pub location: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// PM2.5 in µg/m³, one decimal.
    pub pm25: f64,
    /// Zone of the reading.
    pub category: Pm25Zone,
    /// Provider label.
    pub source: String,
}

impl AirQualityReport {
    /// Build a report from a raw reading.
    ///
    /// The zone is taken from the raw value; only the reported `pm25` is
    /// rounded, so 12.04 is moderate even though it displays as 12.0.
    pub fn new(location: impl Into<String>, lat: f64, lon: f64, pm25: f64) -> Self {
        Self {
            location: location.into(),
            lat,
            lon,
            pm25: round_tenth(pm25),
            category: Pm25Zone::from_pm25(pm25),
            source: OPEN_METEO_SOURCE.to_string(),
        }
    }
}

// ==========================================================================
// Wire types
// ==========================================================================

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<Place>>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    name: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl Place {
    fn label(&self, fallback: &str) -> String {
        let mut label = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback.to_string(),
        };
        for part in [&self.admin1, &self.country].into_iter().flatten() {
            if !part.is_empty() {
                label.push_str(", ");
                label.push_str(part);
            }
        }
        label
    }
}

#[derive(Debug, Default, Deserialize)]
struct AirQualityResponse {
    #[serde(default)]
    current: Option<CurrentValues>,
    #[serde(default)]
    hourly: Option<HourlyValues>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentValues {
    #[serde(default)]
    pm2_5: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyValues {
    #[serde(default)]
    pm2_5: Vec<Option<f64>>,
}

impl AirQualityResponse {
    /// The current reading, else the latest non-null hourly value.
    fn pm25(&self) -> Option<f64> {
        self.current
            .as_ref()
            .and_then(|c| c.pm2_5)
            .or_else(|| {
                self.hourly
                    .as_ref()
                    .and_then(|h| h.pm2_5.iter().rev().find_map(|v| *v))
            })
            .filter(|v| v.is_finite())
    }
}

// ==========================================================================
// OpenMeteoClient
// ==========================================================================

/// HTTP client for the Open-Meteo geocoding and air-quality APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    geocoding_url: String,
    air_quality_url: String,
    language: String,
}

impl OpenMeteoClient {
    /// Create a client from settings.
    pub fn new(config: LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LookupError::InvalidConfig(e.to_string()))?;
        Self::with_client(config, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(config: LookupConfig, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            geocoding_url: normalize_url(&config.geocoding_url)?,
            air_quality_url: normalize_url(&config.air_quality_url)?,
            language: config.language,
        })
    }

    /// Get the geocoding base URL.
    pub fn geocoding_url(&self) -> &str {
        &self.geocoding_url
    }

    /// Get the air-quality base URL.
    pub fn air_quality_url(&self) -> &str {
        &self.air_quality_url
    }

    async fn geocode(&self, location: &str) -> Result<Place> {
        let url = format!("{}/v1/search", self.geocoding_url);
        let query = [
            ("name", location),
            ("count", "1"),
            ("language", self.language.as_str()),
            ("format", "json"),
        ];
        let response: GeocodingResponse = self.get(&url, &query).await?;

        response
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| LookupError::NotFound {
                location: location.to_string(),
            })
    }

    async fn air_quality(&self, lat: f64, lon: f64) -> Result<AirQualityResponse> {
        let url = format!("{}/v1/air-quality", self.air_quality_url);
        let (lat, lon) = (lat.to_string(), lon.to_string());
        let query = [
            ("latitude", lat.as_str()),
            ("longitude", lon.as_str()),
            ("hourly", "pm2_5"),
            ("timezone", "auto"),
            ("current", "pm2_5"),
        ];
        self.get(&url, &query).await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| LookupError::Network {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| LookupError::Network {
            url: url.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("reason").and_then(|r| r.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| LookupError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AirQualitySource for OpenMeteoClient {
    async fn current_pm25(&self, location: &str) -> Result<AirQualityReport> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LookupError::NotFound {
                location: String::new(),
            });
        }

        let place = self.geocode(location).await?;
        let label = place.label(location);
        debug!(
            "Resolved '{}' to {} ({}, {})",
            location, label, place.latitude, place.longitude
        );

        let readings = self.air_quality(place.latitude, place.longitude).await?;
        let pm25 = readings
            .pm25()
            .ok_or_else(|| LookupError::DataUnavailable {
                location: label.clone(),
            })?;

        let report = AirQualityReport::new(label, place.latitude, place.longitude, pm25);
        info!(
            "Current PM2.5 for {}: {} µg/m³ ({})",
            report.location, report.pm25, report.category
        );
        Ok(report)
    }

    fn name(&self) -> &str {
        "open-meteo"
    }
}

fn normalize_url(url: &str) -> Result<String> {
    let url = url.trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(LookupError::InvalidConfig(format!(
            "URL must start with http:// or https://, got: {}",
            url
        )));
    }
    Ok(url)
}
