//! The tool surface driven by an external conversational agent.
//!
//! Four operations are exposed:
//!
//! | Tool | Does |
//! |------|------|
//! | `analyze` | Score a PM2.5 value and a sleep duration |
//! | `log` | Append an observation to the store |
//! | `summarize` | Windowed averages plus the most recent rows |
//! | `lookup_current` | Live PM2.5 for a named place |
//!
//! The typed methods ([`ToolSurface::analyze`] and friends) return
//! [`ToolError`]. [`ToolSurface::dispatch`] wraps them for agents: it takes a
//! tool name and raw JSON arguments and always returns a JSON envelope,
//! either `{"ok": true, "result": ...}` or
//! `{"ok": false, "error": {"code", "message", "details"}}`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use somnair_core::{AirQualityReport, AirQualitySource, LookupError, RiskAssessment, RiskEvaluator};
use somnair_store::{NewObservation, ObservationRow, ObservationStats, Store};
use somnair_types::ValidationError;

use crate::args::{AnalyzeArgs, LogArgs, LookupArgs, SummaryArgs};
use crate::config::DefaultsConfig;

/// Tool name: risk evaluation.
pub const ANALYZE: &str = "analyze";
/// Tool name: append an observation.
pub const LOG: &str = "log";
/// Tool name: windowed summary.
pub const SUMMARIZE: &str = "summarize";
/// Tool name: live air-quality lookup.
pub const LOOKUP_CURRENT: &str = "lookup_current";

/// Every tool name, in declaration order.
pub const TOOL_NAMES: [&str; 4] = [ANALYZE, LOG, SUMMARIZE, LOOKUP_CURRENT];

/// Whether `name` is a known tool.
pub fn is_known_tool(name: &str) -> bool {
    TOOL_NAMES.contains(&name)
}

/// Failure of a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage failure: {0}")]
    Storage(somnair_store::Error),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<somnair_store::Error> for ToolError {
    fn from(e: somnair_store::Error) -> Self {
        match e {
            somnair_store::Error::Validation(v) => ToolError::Validation(v),
            other => ToolError::Storage(other),
        }
    }
}

impl ToolError {
    /// Stable machine-readable code used in error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "validation_error",
            ToolError::Storage(_) => "storage_error",
            ToolError::Lookup(LookupError::NotFound { .. }) => "lookup_not_found",
            ToolError::Lookup(LookupError::DataUnavailable { .. }) => "lookup_data_unavailable",
            ToolError::Lookup(_) => "network_error",
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::Internal(_) => "internal_error",
        }
    }

    fn details(&self) -> Value {
        match self {
            ToolError::Validation(e) => json!({ "field": e.field() }),
            ToolError::Lookup(LookupError::NotFound { location })
            | ToolError::Lookup(LookupError::DataUnavailable { location }) => {
                json!({ "location": location })
            }
            ToolError::Lookup(e) => json!({ "timeout": e.is_timeout() }),
            ToolError::UnknownTool(_) => json!({ "available": TOOL_NAMES }),
            ToolError::Storage(_) | ToolError::Internal(_) => json!({}),
        }
    }
}

/// Result type for tool calls.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Wrap a successful result in an envelope.
pub fn ok_envelope<T: Serialize>(result: &T) -> Value {
    match serde_json::to_value(result) {
        Ok(result) => json!({ "ok": true, "result": result }),
        Err(e) => error_envelope(&ToolError::Internal(e.to_string())),
    }
}

/// Wrap a failure in an envelope.
pub fn error_envelope(err: &ToolError) -> Value {
    json!({
        "ok": false,
        "error": {
            "code": err.code(),
            "message": err.to_string(),
            "details": err.details(),
        }
    })
}

/// Confirmation returned by the `log` tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogReceipt {
    /// Always `"OK"`.
    pub status: &'static str,
    /// Id assigned by the store.
    pub id: i64,
    /// Timestamp assigned by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Result of the `summarize` tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepSummary {
    /// Averages over the window.
    #[serde(flatten)]
    pub stats: ObservationStats,
    /// Most recent rows, newest first.
    pub recent: Vec<ObservationRow>,
}

/// A tool declaration for an agent's function-calling interface.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// JSON-schema declarations for every tool.
pub fn tool_declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: ANALYZE,
            description: "Non-medical analysis of how PM2.5 affects sleep. Returns the air \
                          quality zone, a heuristic relative risk in percent and practical tips.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "pm25": { "type": "number", "description": "PM2.5 in µg/m³" },
                    "sleep_duration_hours": { "type": "number", "description": "Sleep duration in hours" }
                },
                "required": ["pm25", "sleep_duration_hours"]
            }),
        },
        ToolDeclaration {
            name: LOG,
            description: "Save one night's PM2.5 and sleep duration, with an optional quality \
                          label and note.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "pm25": { "type": "number", "description": "PM2.5 in µg/m³" },
                    "sleep_duration_hours": { "type": "number", "description": "Sleep duration in hours" },
                    "quality_label": { "type": "string", "description": "Free-text quality, e.g. baik or buruk" },
                    "note": { "type": "string", "description": "Free-text note" }
                },
                "required": ["pm25", "sleep_duration_hours"]
            }),
        },
        ToolDeclaration {
            name: SUMMARIZE,
            description: "Average PM2.5 and sleep duration over the last N days, plus the most \
                          recent log entries.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "days": { "type": "integer", "description": "Window in days" },
                    "recent_count": { "type": "integer", "description": "Number of recent entries" }
                }
            }),
        },
        ToolDeclaration {
            name: LOOKUP_CURRENT,
            description: "Current outdoor PM2.5 for a place name (city or area), via Open-Meteo.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string", "description": "Place name" }
                },
                "required": ["location"]
            }),
        },
    ]
}

/// The four tools bound to a store and an air-quality source.
pub struct ToolSurface {
    store: Arc<Store>,
    lookup: Arc<dyn AirQualitySource>,
    evaluator: RiskEvaluator,
    defaults: DefaultsConfig,
}

impl ToolSurface {
    /// Create a tool surface with default risk settings and tool defaults.
    pub fn new(store: Arc<Store>, lookup: Arc<dyn AirQualitySource>) -> Self {
        Self {
            store,
            lookup,
            evaluator: RiskEvaluator::default(),
            defaults: DefaultsConfig::default(),
        }
    }

    /// Use different defaults for omitted `summarize` arguments.
    pub fn with_defaults(mut self, defaults: DefaultsConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Use a different risk evaluator.
    pub fn with_evaluator(mut self, evaluator: RiskEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Score a night.
    pub fn analyze(&self, args: &AnalyzeArgs) -> ToolResult<RiskAssessment> {
        let sample = args.sample()?;
        Ok(self.evaluator.evaluate_sample(&sample))
    }

    /// Append an observation.
    pub fn log(&self, args: &LogArgs) -> ToolResult<LogReceipt> {
        let mut observation = NewObservation::new(args.pm25, args.sleep_duration_hours);
        if let Some(label) = &args.quality_label {
            observation = observation.quality_label(label.as_str());
        }
        if let Some(note) = &args.note {
            observation = observation.note(note.as_str());
        }

        let stored = self.store.append(&observation)?;
        Ok(LogReceipt {
            status: "OK",
            id: stored.id,
            timestamp: stored.timestamp,
        })
    }

    /// Averages over the window plus the most recent rows.
    pub fn summarize(&self, args: &SummaryArgs) -> ToolResult<SleepSummary> {
        let days = args.days.unwrap_or(self.defaults.summary_days);
        let recent_count = args.recent_count.unwrap_or(self.defaults.recent_count);

        let stats = self.store.summarize(days)?;
        let recent = self
            .store
            .recent(recent_count)?
            .iter()
            .map(|o| o.to_row())
            .collect();
        Ok(SleepSummary { stats, recent })
    }

    /// Live PM2.5 for a place.
    pub async fn lookup_current(&self, args: &LookupArgs) -> ToolResult<AirQualityReport> {
        debug!("Looking up {} via {}", args.location, self.lookup.name());
        Ok(self.lookup.current_pm25(&args.location).await?)
    }

    /// Run a tool by name and wrap the outcome in an envelope.
    ///
    /// Never fails: every error becomes an `{"ok": false, ...}` envelope.
    pub async fn dispatch(&self, name: &str, args: &Value) -> Value {
        match self.call(name, args).await {
            Ok(result) => {
                info!("Tool {} succeeded", name);
                ok_envelope(&result)
            }
            Err(e) => {
                warn!("Tool {} failed ({}): {}", name, e.code(), e);
                error_envelope(&e)
            }
        }
    }

    async fn call(&self, name: &str, args: &Value) -> ToolResult<Value> {
        match name {
            ANALYZE => to_value(&self.analyze(&AnalyzeArgs::from_json(args)?)?),
            LOG => to_value(&self.log(&LogArgs::from_json(args)?)?),
            SUMMARIZE => to_value(&self.summarize(&SummaryArgs::from_json(args)?)?),
            LOOKUP_CURRENT => {
                to_value(&self.lookup_current(&LookupArgs::from_json(args)?).await?)
            }
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> ToolResult<Value> {
    serde_json::to_value(value).map_err(|e| ToolError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use somnair_core::MockAirQuality;

    fn surface() -> ToolSurface {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let lookup = Arc::new(MockAirQuality::new().with_reading("Bandung", -6.9, 107.6, 27.84));
        ToolSurface::new(store, lookup)
    }

    #[test]
    fn test_tool_names_match_declarations() {
        let names: Vec<_> = tool_declarations().iter().map(|d| d.name).collect();
        assert_eq!(names, TOOL_NAMES);
        assert!(is_known_tool("summarize"));
        assert!(!is_known_tool("drop_table"));
    }

    #[test]
    fn test_analyze() {
        let result = surface()
            .analyze(&AnalyzeArgs {
                pm25: 28.0,
                sleep_duration_hours: 7.0,
            })
            .unwrap();
        assert_eq!(result.risk_relative_percent, 67.2);
        assert_eq!(result.tips.len(), 3);
    }

    #[test]
    fn test_analyze_rejects_negative() {
        let err = surface()
            .analyze(&AnalyzeArgs {
                pm25: -5.0,
                sleep_duration_hours: 7.0,
            })
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_log_then_summarize() {
        let tools = surface();
        let receipt = tools
            .log(&LogArgs {
                pm25: 35.0,
                sleep_duration_hours: 6.0,
                quality_label: Some("buruk".into()),
                note: Some("AC bocor".into()),
            })
            .unwrap();
        assert_eq!(receipt.status, "OK");
        assert_eq!(receipt.id, 1);

        let summary = tools.summarize(&SummaryArgs::default()).unwrap();
        assert_eq!(summary.stats.count, 1);
        assert_eq!(summary.stats.avg_pm, 35.0);
        assert_eq!(summary.recent.len(), 1);
        assert_eq!(summary.recent[0].3.as_deref(), Some("buruk"));
        assert_eq!(summary.recent[0].4.as_deref(), Some("AC bocor"));
    }

    #[test]
    fn test_summarize_uses_configured_defaults() {
        let tools = surface().with_defaults(DefaultsConfig {
            summary_days: 7,
            recent_count: 2,
        });
        for pm25 in [10.0, 20.0, 30.0] {
            tools
                .log(&LogArgs {
                    pm25,
                    sleep_duration_hours: 7.0,
                    ..Default::default()
                })
                .unwrap();
        }

        let summary = tools.summarize(&SummaryArgs::default()).unwrap();
        assert_eq!(summary.stats.count, 3);
        assert_eq!(summary.recent.len(), 2);
        assert_eq!(summary.recent[0].1, 30.0);
    }

    #[test]
    fn test_summary_serializes_flat() {
        let tools = surface();
        let value = to_value(&tools.summarize(&SummaryArgs::default()).unwrap()).unwrap();
        assert_eq!(value["avg_pm"], 0.0);
        assert_eq!(value["avg_duration_hours"], 0.0);
        assert_eq!(value["count"], 0);
        assert!(value["recent"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_store_validation_maps_to_validation_code() {
        let err = ToolError::from(somnair_store::Error::Validation(
            ValidationError::NonFinite {
                field: "pm25".into(),
            },
        ));
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn test_lookup_error_codes() {
        let not_found = ToolError::Lookup(LookupError::NotFound {
            location: "x".into(),
        });
        assert_eq!(not_found.code(), "lookup_not_found");

        let no_data = ToolError::Lookup(LookupError::DataUnavailable {
            location: "x".into(),
        });
        assert_eq!(no_data.code(), "lookup_data_unavailable");

        let api = ToolError::Lookup(LookupError::Api {
            status: 502,
            message: "bad gateway".into(),
        });
        assert_eq!(api.code(), "network_error");
    }

    #[tokio::test]
    async fn test_dispatch_analyze_envelope() {
        let envelope = surface()
            .dispatch(ANALYZE, &json!({"pm25": "28", "sleep_duration_hours": 7}))
            .await;
        assert_eq!(envelope["ok"], true);
        assert_eq!(envelope["result"]["zone"], "moderate");
        assert_eq!(envelope["result"]["risk_relative_percent"], 67.2);
        assert!(envelope["result"]["disclaimer"].is_string());
    }

    #[tokio::test]
    async fn test_dispatch_validation_error() {
        let envelope = surface()
            .dispatch(ANALYZE, &json!({"pm25": "abc", "sleep_duration_hours": 7}))
            .await;
        assert_eq!(envelope["ok"], false);
        assert_eq!(envelope["error"]["code"], "validation_error");
        assert_eq!(envelope["error"]["details"]["field"], "pm25");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let envelope = surface().dispatch("delete_everything", &Value::Null).await;
        assert_eq!(envelope["ok"], false);
        assert_eq!(envelope["error"]["code"], "unknown_tool");
        assert_eq!(envelope["error"]["details"]["available"][0], ANALYZE);
    }

    #[tokio::test]
    async fn test_dispatch_lookup() {
        let tools = surface();

        let envelope = tools
            .dispatch(LOOKUP_CURRENT, &json!({"location": "bandung"}))
            .await;
        assert_eq!(envelope["ok"], true);
        assert_eq!(envelope["result"]["pm25"], 27.8);
        assert_eq!(envelope["result"]["category"], "moderate");
        assert_eq!(envelope["result"]["source"], "Open-Meteo (no key)");

        let envelope = tools
            .dispatch(LOOKUP_CURRENT, &json!({"location": "Atlantis"}))
            .await;
        assert_eq!(envelope["ok"], false);
        assert_eq!(envelope["error"]["code"], "lookup_not_found");
        assert_eq!(envelope["error"]["details"]["location"], "Atlantis");
    }

    #[tokio::test]
    async fn test_dispatch_summarize_without_args() {
        let envelope = surface().dispatch(SUMMARIZE, &Value::Null).await;
        assert_eq!(envelope["ok"], true);
        assert_eq!(envelope["result"]["count"], 0);
    }

    #[test]
    fn test_ok_envelope() {
        let envelope = ok_envelope(&json!({"a": 1}));
        assert_eq!(envelope, json!({"ok": true, "result": {"a": 1}}));
    }
}
