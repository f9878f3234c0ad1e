//! PM2.5 sleep risk scoring.
//!
//! This module maps a PM2.5 concentration and a sleep duration into a
//! qualitative zone, a relative risk percentage and a short list of tips.
//!
//! The relative risk grows linearly above the good-zone bound: every
//! 5 µg/m³ over 12 µg/m³ adds 21 %. This is a conversational heuristic and
//! not a clinical estimate; every [`RiskAssessment`] carries
//! [`RISK_DISCLAIMER`] to say so.
//!
//! # Example
//!
//! ```
//! use somnair_core::{Pm25Zone, RiskEvaluator};
//!
//! let evaluator = RiskEvaluator::default();
//!
//! let assessment = evaluator.evaluate(8.0, 8.0);
//! assert_eq!(assessment.zone, Pm25Zone::Good);
//! assert_eq!(assessment.risk_relative_percent, 0.0);
//! assert_eq!(assessment.tips.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use somnair_types::{GOOD_MAX_PM25, MODERATE_MAX_PM25, Pm25Zone, SleepSample, round_tenth};

/// Guidance shown outside the good zone, highest priority first.
///
/// Only the first [`TIPS_SHOWN`] entries are returned, so the order decides
/// which tips the user sees.
pub const SLEEP_TIPS: [&str; 4] = [
    "Keep PM2.5 below 12 µg/m³ while you sleep.",
    "Run an air purifier 30-60 minutes before bedtime.",
    "Keep doors and windows closed while sleeping.",
    "Check the purifier filter and replace it when the indicator passes 80%.",
];

/// Number of tips returned for moderate and poor air.
pub const TIPS_SHOWN: usize = 3;

/// Single message returned for good air.
pub const GOOD_AIR_TIP: &str =
    "Air quality is already optimal; keep it this way for good quality sleep.";

/// Label attached to every assessment.
pub const RISK_DISCLAIMER: &str =
    "Relative risk is an unvalidated heuristic for education, not medical advice.";

/// Parameters of the risk heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Upper bound of the good zone; risk is zero at or below it.
    pub good_max: f64,
    /// Upper bound of the moderate zone.
    pub moderate_max: f64,
    /// Concentration step in µg/m³.
    pub step: f64,
    /// Relative risk added per step, as a fraction.
    pub risk_per_step: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            good_max: GOOD_MAX_PM25,
            moderate_max: MODERATE_MAX_PM25,
            step: 5.0,
            risk_per_step: 0.21,
        }
    }
}

/// Result of scoring one night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Air-quality zone of the concentration.
    pub zone: Pm25Zone,
    /// Relative risk in percent, one decimal.
    pub risk_relative_percent: f64,
    /// Sleep duration echoed back, in hours.
    pub duration_hours: f64,
    /// Practical guidance, most important first.
    pub tips: Vec<String>,
    /// Reminder that the figure is a heuristic.
    pub disclaimer: String,
}

/// Deterministic risk evaluator.
#[derive(Debug, Clone, Default)]
pub struct RiskEvaluator {
    config: RiskConfig,
}

impl RiskEvaluator {
    /// Create an evaluator with the given configuration.
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Zone of a concentration under this configuration.
    pub fn zone(&self, pm25: f64) -> Pm25Zone {
        Pm25Zone::classify(pm25, self.config.good_max, self.config.moderate_max)
    }

    /// Relative risk in percent, rounded to one decimal.
    ///
    /// Zero at or below the good-zone bound, including negative input.
    pub fn relative_risk_percent(&self, pm25: f64) -> f64 {
        let steps = ((pm25 - self.config.good_max) / self.config.step).max(0.0);
        round_tenth(steps * self.config.risk_per_step * 100.0)
    }

    /// Score a concentration and a sleep duration.
    ///
    /// Never fails; input validation happens before this point (see
    /// [`SleepSample::new`]).
    pub fn evaluate(&self, pm25: f64, sleep_duration_hours: f64) -> RiskAssessment {
        let zone = self.zone(pm25);
        RiskAssessment {
            zone,
            risk_relative_percent: self.relative_risk_percent(pm25),
            duration_hours: sleep_duration_hours,
            tips: tips_for(zone),
            disclaimer: RISK_DISCLAIMER.to_string(),
        }
    }

    /// Score a validated sample.
    pub fn evaluate_sample(&self, sample: &SleepSample) -> RiskAssessment {
        self.evaluate(sample.pm25, sample.sleep_duration_hours)
    }
}

fn tips_for(zone: Pm25Zone) -> Vec<String> {
    match zone {
        Pm25Zone::Good => vec![GOOD_AIR_TIP.to_string()],
        Pm25Zone::Moderate | Pm25Zone::Poor => SLEEP_TIPS
            .iter()
            .take(TIPS_SHOWN)
            .map(|tip| tip.to_string())
            .collect(),
    }
}
