//! Core value types for PM2.5 and sleep observations.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// Upper bound (inclusive) of the good zone, in µg/m³.
pub const GOOD_MAX_PM25: f64 = 12.0;

/// Upper bound (inclusive) of the moderate zone, in µg/m³.
pub const MODERATE_MAX_PM25: f64 = 35.0;

/// Qualitative air-quality bucket for a PM2.5 concentration.
///
/// Zones are always derived from a concentration and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Pm25Zone {
    /// PM2.5 ≤ 12 µg/m³.
    Good,
    /// 12 < PM2.5 ≤ 35 µg/m³.
    Moderate,
    /// PM2.5 > 35 µg/m³.
    Poor,
}

impl Pm25Zone {
    /// Classify a concentration using the standard thresholds.
    ///
    /// # Examples
    ///
    /// ```
    /// use somnair_types::Pm25Zone;
    ///
    /// assert_eq!(Pm25Zone::from_pm25(12.0), Pm25Zone::Good);
    /// assert_eq!(Pm25Zone::from_pm25(12.1), Pm25Zone::Moderate);
    /// assert_eq!(Pm25Zone::from_pm25(35.0), Pm25Zone::Moderate);
    /// assert_eq!(Pm25Zone::from_pm25(35.1), Pm25Zone::Poor);
    /// ```
    #[must_use]
    pub fn from_pm25(pm25: f64) -> Self {
        Self::classify(pm25, GOOD_MAX_PM25, MODERATE_MAX_PM25)
    }

    /// Classify a concentration against custom zone bounds.
    #[must_use]
    pub fn classify(pm25: f64, good_max: f64, moderate_max: f64) -> Self {
        if pm25 <= good_max {
            Pm25Zone::Good
        } else if pm25 <= moderate_max {
            Pm25Zone::Moderate
        } else {
            Pm25Zone::Poor
        }
    }

    /// Lowercase identifier, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Pm25Zone::Good => "good",
            Pm25Zone::Moderate => "moderate",
            Pm25Zone::Poor => "poor",
        }
    }

    /// Human-readable description of the zone.
    pub fn description(&self) -> &'static str {
        match self {
            Pm25Zone::Good => "Good - suitable for sleep",
            Pm25Zone::Moderate => "Moderate - above the sleep target",
            Pm25Zone::Poor => "Poor - unhealthy for a bedroom",
        }
    }

    /// Suggested action for this zone.
    pub fn action(&self) -> &'static str {
        match self {
            Pm25Zone::Good => "No action needed",
            Pm25Zone::Moderate => "Filter the bedroom air before sleeping",
            Pm25Zone::Poor => "Run a purifier and seal the room before sleeping",
        }
    }
}

impl fmt::Display for Pm25Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated pair of PM2.5 concentration and sleep duration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SleepSample {
    /// PM2.5 concentration in µg/m³.
    pub pm25: f64,
    /// Sleep duration in hours.
    pub sleep_duration_hours: f64,
}

impl SleepSample {
    /// Validate and build a sample.
    ///
    /// Both values must be finite and non-negative.
    pub fn new(pm25: f64, sleep_duration_hours: f64) -> ValidationResult<Self> {
        Ok(Self {
            pm25: non_negative("pm25", pm25)?,
            sleep_duration_hours: non_negative("sleep_duration_hours", sleep_duration_hours)?,
        })
    }

    /// Zone of this sample's concentration.
    #[must_use]
    pub fn zone(&self) -> Pm25Zone {
        Pm25Zone::from_pm25(self.pm25)
    }
}

fn non_negative(field: &str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            field: field.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Parse free text into a real number for `field`.
///
/// Surrounding whitespace is ignored and a comma decimal separator is
/// accepted ("7,5" parses as 7.5).
pub fn parse_real(field: &str, raw: &str) -> ValidationResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing {
            field: field.to_string(),
        });
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

/// Round to one decimal place.
///
/// A value whose scaled form is an exact tie goes to the even digit:
/// 10.25 rounds to 10.2 and 10.75 to 10.8.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(Pm25Zone::from_pm25(0.0), Pm25Zone::Good);
        assert_eq!(Pm25Zone::from_pm25(12.0), Pm25Zone::Good);
        assert_eq!(Pm25Zone::from_pm25(12.01), Pm25Zone::Moderate);
        assert_eq!(Pm25Zone::from_pm25(35.0), Pm25Zone::Moderate);
        assert_eq!(Pm25Zone::from_pm25(35.01), Pm25Zone::Poor);
        assert_eq!(Pm25Zone::from_pm25(500.0), Pm25Zone::Poor);
    }

    #[test]
    fn test_negative_concentration_is_good_zone() {
        assert_eq!(Pm25Zone::from_pm25(-3.0), Pm25Zone::Good);
    }

    #[test]
    fn test_zone_display_and_serde() {
        assert_eq!(Pm25Zone::Moderate.to_string(), "moderate");
        let json = serde_json::to_string(&Pm25Zone::Poor).unwrap();
        assert_eq!(json, "\"poor\"");
        let zone: Pm25Zone = serde_json::from_str("\"good\"").unwrap();
        assert_eq!(zone, Pm25Zone::Good);
    }

    #[test]
    fn test_zone_texts() {
        assert!(Pm25Zone::Good.description().starts_with("Good"));
        assert!(Pm25Zone::Good.action().contains("No action"));
        assert!(Pm25Zone::Poor.action().contains("purifier"));
    }

    #[test]
    fn test_sample_accepts_zero() {
        let sample = SleepSample::new(0.0, 0.0).unwrap();
        assert_eq!(sample.zone(), Pm25Zone::Good);
    }

    #[test]
    fn test_sample_rejects_negative_pm25() {
        let err = SleepSample::new(-1.0, 7.0).unwrap_err();
        assert_eq!(err.field(), "pm25");
        assert!(matches!(err, ValidationError::Negative { .. }));
    }

    #[test]
    fn test_sample_rejects_non_finite_duration() {
        let err = SleepSample::new(10.0, f64::NAN).unwrap_err();
        assert_eq!(err.field(), "sleep_duration_hours");
        assert!(matches!(err, ValidationError::NonFinite { .. }));

        assert!(SleepSample::new(f64::INFINITY, 7.0).is_err());
    }

    #[test]
    fn test_parse_real() {
        assert_eq!(parse_real("pm25", "28").unwrap(), 28.0);
        assert_eq!(parse_real("pm25", " 7.5 ").unwrap(), 7.5);
        assert_eq!(parse_real("pm25", "7,5").unwrap(), 7.5);
        assert!(matches!(
            parse_real("pm25", "abc"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_real("pm25", "  "),
            Err(ValidationError::Missing { .. })
        ));
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(67.200_000_000_01), 67.2);
        assert_eq!(round_tenth(6.46), 6.5);
        assert_eq!(round_tenth(6.44), 6.4);
        assert_eq!(round_tenth(0.0), 0.0);
    }

    #[test]
    fn test_round_tenth_ties_to_even() {
        assert_eq!(round_tenth(10.25), 10.2);
        assert_eq!(round_tenth(10.75), 10.8);
        assert_eq!(round_tenth(0.05), 0.0);
        assert_eq!(round_tenth(-10.25), -10.2);
    }

    proptest! {
        #[test]
        fn prop_valid_samples_round_trip(pm25 in 0.0f64..1000.0, hours in 0.0f64..24.0) {
            let sample = SleepSample::new(pm25, hours).unwrap();
            prop_assert_eq!(sample.pm25, pm25);
            prop_assert_eq!(sample.sleep_duration_hours, hours);
        }

        #[test]
        fn prop_zone_is_monotonic(a in -50.0f64..500.0, b in -50.0f64..500.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank = |z: Pm25Zone| z as u8;
            prop_assert!(rank(Pm25Zone::from_pm25(lo)) <= rank(Pm25Zone::from_pm25(hi)));
        }
    }
}
