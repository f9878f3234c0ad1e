//! Risk scoring and live air-quality lookup for the Somnair sleep coach.
//!
//! # Features
//!
//! - **Risk evaluation**: map a PM2.5 concentration and a sleep duration to a
//!   zone, a relative risk percentage and practical tips
//! - **Live lookup**: resolve a place name and fetch its current PM2.5 from
//!   Open-Meteo (no API key required)
//! - **Mocking**: an in-memory [`AirQualitySource`] for tests
//!
//! The relative risk figure is a heuristic for conversation, not a
//! validated medical model.
//!
//! # Quick Start
//!
//! ```
//! use somnair_core::RiskEvaluator;
//!
//! let assessment = RiskEvaluator::default().evaluate(28.0, 7.0);
//! assert_eq!(assessment.risk_relative_percent, 67.2);
//! assert_eq!(assessment.tips.len(), 3);
//! ```

pub mod air_quality;
pub mod error;
pub mod mock;
pub mod risk;
pub mod traits;

pub use air_quality::{AirQualityReport, LookupConfig, OpenMeteoClient};
pub use error::{LookupError, Result};
pub use mock::MockAirQuality;
pub use risk::{RISK_DISCLAIMER, RiskAssessment, RiskConfig, RiskEvaluator, SLEEP_TIPS};
pub use traits::AirQualitySource;

pub use somnair_types::{Pm25Zone, SleepSample, ValidationError};
