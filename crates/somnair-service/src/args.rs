//! Typed tool arguments.
//!
//! Agents send loosely typed JSON: numbers arrive as `7`, `7.5` or `"7,5"`.
//! Every coercion happens here, so the tool surface only sees typed,
//! validated values. Older field names (`sleep_dur_h`, `kualitas`,
//! `catatan`, `n_recent`) are accepted as aliases.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use somnair_types::{SleepSample, ValidationError, ValidationResult, parse_real};

/// Arguments of the `analyze` tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeArgs {
    pub pm25: f64,
    pub sleep_duration_hours: f64,
}

impl AnalyzeArgs {
    /// Parse from a JSON arguments object.
    pub fn from_json(args: &Value) -> ValidationResult<Self> {
        let args = ArgMap::new(args)?;
        Ok(Self {
            pm25: args.real("pm25", &[])?,
            sleep_duration_hours: args.real("sleep_duration_hours", &["sleep_dur_h"])?,
        })
    }

    /// Validate into a sample.
    pub fn sample(&self) -> ValidationResult<SleepSample> {
        SleepSample::new(self.pm25, self.sleep_duration_hours)
    }
}

/// Arguments of the `log` tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogArgs {
    pub pm25: f64,
    pub sleep_duration_hours: f64,
    #[serde(default)]
    pub quality_label: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl LogArgs {
    /// Parse from a JSON arguments object.
    pub fn from_json(args: &Value) -> ValidationResult<Self> {
        let args = ArgMap::new(args)?;
        Ok(Self {
            pm25: args.real("pm25", &[])?,
            sleep_duration_hours: args.real("sleep_duration_hours", &["sleep_dur_h"])?,
            quality_label: args.text("quality_label", &["kualitas"])?,
            note: args.text("note", &["catatan"])?,
        })
    }
}

/// Arguments of the `summarize` tool. Missing values fall back to the
/// configured defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryArgs {
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default)]
    pub recent_count: Option<i64>,
}

impl SummaryArgs {
    /// Parse from a JSON arguments object.
    pub fn from_json(args: &Value) -> ValidationResult<Self> {
        let args = ArgMap::new(args)?;
        Ok(Self {
            days: args.integer("days", &[])?,
            recent_count: args.integer("recent_count", &["n_recent"])?,
        })
    }
}

/// Arguments of the `lookup_current` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupArgs {
    pub location: String,
}

impl LookupArgs {
    /// Parse from a JSON arguments object. The location must not be blank.
    pub fn from_json(args: &Value) -> ValidationResult<Self> {
        let args = ArgMap::new(args)?;
        let location = args
            .text("location", &[])?
            .ok_or_else(|| ValidationError::Missing {
                field: "location".to_string(),
            })?;
        Self::new(location)
    }

    /// Build from a place name.
    pub fn new(location: impl Into<String>) -> ValidationResult<Self> {
        let location = location.into().trim().to_string();
        if location.is_empty() {
            return Err(ValidationError::Empty {
                field: "location".to_string(),
            });
        }
        Ok(Self { location })
    }
}

/// View over a JSON arguments object. `null` counts as no arguments.
struct ArgMap<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> ArgMap<'a> {
    fn new(args: &'a Value) -> ValidationResult<Self> {
        match args {
            Value::Null => Ok(Self { map: None }),
            Value::Object(map) => Ok(Self { map: Some(map) }),
            _ => Err(ValidationError::InvalidType {
                field: "arguments".to_string(),
                expected: "an object",
            }),
        }
    }

    /// First non-null value under `field` or one of its aliases.
    fn get(&self, field: &str, aliases: &[&str]) -> Option<&'a Value> {
        let map = self.map?;
        std::iter::once(field)
            .chain(aliases.iter().copied())
            .filter_map(|name| map.get(name))
            .find(|v| !v.is_null())
    }

    fn real(&self, field: &str, aliases: &[&str]) -> ValidationResult<f64> {
        match self.get(field, aliases) {
            None => Err(ValidationError::Missing {
                field: field.to_string(),
            }),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| ValidationError::NotANumber {
                field: field.to_string(),
                value: n.to_string(),
            }),
            Some(Value::String(s)) => parse_real(field, s),
            Some(_) => Err(ValidationError::InvalidType {
                field: field.to_string(),
                expected: "a number",
            }),
        }
    }

    fn integer(&self, field: &str, aliases: &[&str]) -> ValidationResult<Option<i64>> {
        let value = match self.get(field, aliases) {
            None => return Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => return Ok(Some(i)),
                None => n.as_f64().unwrap_or(f64::NAN),
            },
            Some(Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(i) => return Ok(Some(i)),
                Err(_) => parse_real(field, s)?,
            },
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: field.to_string(),
                    expected: "an integer",
                });
            }
        };

        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                field: field.to_string(),
            });
        }
        // Fractional counts truncate toward zero; `as` saturates out-of-range values.
        Ok(Some(value.trunc() as i64))
    }

    fn text(&self, field: &str, aliases: &[&str]) -> ValidationResult<Option<String>> {
        match self.get(field, aliases) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
            Some(_) => Err(ValidationError::InvalidType {
                field: field.to_string(),
                expected: "a string",
            }),
        }
    }
}
