//! Shared types for the Somnair PM2.5 and sleep coach.
//!
//! This crate holds the small vocabulary every other crate speaks:
//!
//! - [`Pm25Zone`]: the good / moderate / poor bucket for a PM2.5 concentration
//! - [`SleepSample`]: a validated (PM2.5, sleep duration) pair
//! - [`ValidationError`]: the error raised for malformed input
//!
//! # Example
//!
//! ```
//! use somnair_types::{Pm25Zone, SleepSample};
//!
//! let sample = SleepSample::new(28.0, 7.0)?;
//! assert_eq!(Pm25Zone::from_pm25(sample.pm25), Pm25Zone::Moderate);
//! # Ok::<(), somnair_types::ValidationError>(())
//! ```

pub mod error;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::{
    GOOD_MAX_PM25, MODERATE_MAX_PM25, Pm25Zone, SleepSample, parse_real, round_tenth,
};
