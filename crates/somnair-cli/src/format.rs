//! Output formatting utilities for text and JSON output.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;

use somnair_core::{AirQualityReport, RiskAssessment};
use somnair_service::{LogReceipt, SleepSummary, ToolDeclaration};
use somnair_types::Pm25Zone;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            compact: false,
        }
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }
}

/// Format a zone as a bracketed, color-coded label.
#[must_use]
pub fn format_zone(zone: Pm25Zone, no_color: bool) -> String {
    let label = zone.as_str().to_uppercase();

    if no_color {
        format!("[{}]", label)
    } else {
        match zone {
            Pm25Zone::Good => format!("[{}]", label.green()),
            Pm25Zone::Moderate => format!("[{}]", label.yellow()),
            Pm25Zone::Poor => format!("[{}]", label.red()),
        }
    }
}

/// Format a concentration in µg/m³ with one decimal.
#[must_use]
pub fn format_pm25(pm25: f64) -> String {
    format!("{:.1} µg/m³", pm25)
}

fn heading(text: &str, opts: &FormatOptions) -> String {
    if opts.no_color {
        text.to_string()
    } else {
        text.bold().to_string()
    }
}

#[must_use]
pub fn format_assessment_text(assessment: &RiskAssessment, opts: &FormatOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Zone:          {} {}",
        format_zone(assessment.zone, opts.no_color),
        assessment.zone.description()
    );
    let _ = writeln!(
        out,
        "Relative risk: +{:.1}%",
        assessment.risk_relative_percent
    );
    let _ = writeln!(out, "Sleep:         {:.1} h", assessment.duration_hours);
    let _ = writeln!(out, "{}", heading("Tips:", opts));
    for tip in &assessment.tips {
        let _ = writeln!(out, "  - {}", tip);
    }
    let note = if opts.no_color {
        assessment.disclaimer.clone()
    } else {
        assessment.disclaimer.dimmed().to_string()
    };
    let _ = writeln!(out, "{}", note);
    out
}

#[must_use]
pub fn format_receipt_text(receipt: &LogReceipt) -> String {
    format!(
        "{}: saved observation #{} at {}\n",
        receipt.status,
        receipt.id,
        format_timestamp(receipt)
    )
}

fn format_timestamp(receipt: &LogReceipt) -> String {
    let ts = receipt.timestamp;
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        ts.year(),
        u8::from(ts.month()),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    )
}

#[must_use]
pub fn format_summary_text(summary: &SleepSummary, days: i64, opts: &FormatOptions) -> String {
    let stats = &summary.stats;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        heading(&format!("Last {} days: {} logs", days.max(0), stats.count), opts)
    );
    if stats.count > 0 {
        let _ = writeln!(
            out,
            "  Avg PM2.5: {} {}",
            format_pm25(stats.avg_pm),
            format_zone(Pm25Zone::from_pm25(stats.avg_pm), opts.no_color)
        );
        let _ = writeln!(out, "  Avg sleep: {:.1} h", stats.avg_duration_hours);
    }

    if summary.recent.is_empty() {
        return out;
    }
    let _ = writeln!(out, "{}", heading("Recent:", opts));
    for (ts, pm25, hours, label, note) in &summary.recent {
        let mut line = format!("  {}  {:>12}  {:>5.1} h", ts, format_pm25(*pm25), hours);
        if let Some(label) = label {
            line.push_str("  ");
            line.push_str(label);
        }
        if let Some(note) = note {
            line.push_str("  ");
            line.push_str(note);
        }
        let _ = writeln!(out, "{}", line);
    }
    out
}

#[must_use]
pub fn format_report_text(report: &AirQualityReport, opts: &FormatOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(&report.location, opts));
    let _ = writeln!(
        out,
        "  PM2.5: {} {}",
        format_pm25(report.pm25),
        format_zone(report.category, opts.no_color)
    );
    let _ = writeln!(out, "  At:    {:.4}, {:.4}", report.lat, report.lon);
    let _ = writeln!(out, "  Via:   {}", report.source);
    out
}

#[must_use]
pub fn format_tools_text(declarations: &[ToolDeclaration], opts: &FormatOptions) -> String {
    let mut out = String::new();
    for decl in declarations {
        let _ = writeln!(out, "{}", heading(decl.name, opts));
        let _ = writeln!(out, "  {}", decl.description);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use somnair_core::RiskEvaluator;
    use somnair_store::ObservationStats;
    use time::macros::datetime;

    fn plain() -> FormatOptions {
        FormatOptions::new(true)
    }

    #[test]
    fn test_format_zone_no_color() {
        assert_eq!(format_zone(Pm25Zone::Good, true), "[GOOD]");
        assert_eq!(format_zone(Pm25Zone::Moderate, true), "[MODERATE]");
        assert_eq!(format_zone(Pm25Zone::Poor, true), "[POOR]");
    }

    #[test]
    fn test_format_zone_with_color_contains_label() {
        let result = format_zone(Pm25Zone::Poor, false);
        assert!(result.contains("POOR"));
        assert_ne!(result, "[POOR]");
    }

    #[test]
    fn test_format_pm25() {
        assert_eq!(format_pm25(27.84), "27.8 µg/m³");
        assert_eq!(format_pm25(0.0), "0.0 µg/m³");
    }

    #[test]
    fn test_as_json_compact() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(plain().with_compact(true).as_json(&value).unwrap(), "{\"a\":1}\n");
        assert!(plain().as_json(&value).unwrap().contains("\n  \"a\": 1"));
    }

    #[test]
    fn test_assessment_text() {
        let assessment = RiskEvaluator::default().evaluate(28.0, 7.0);
        let text = format_assessment_text(&assessment, &plain());
        assert!(text.contains("[MODERATE]"));
        assert!(text.contains("+67.2%"));
        assert!(text.contains("7.0 h"));
        assert_eq!(text.matches("  - ").count(), 3);
        assert!(text.contains(&assessment.disclaimer));
    }

    #[test]
    fn test_receipt_text() {
        let receipt = LogReceipt {
            status: "OK",
            id: 4,
            timestamp: datetime!(2026-03-01 22:15:09 UTC),
        };
        assert_eq!(
            format_receipt_text(&receipt),
            "OK: saved observation #4 at 2026-03-01 22:15:09 UTC\n"
        );
    }

    #[test]
    fn test_summary_text_empty() {
        let summary = SleepSummary {
            stats: ObservationStats::default(),
            recent: Vec::new(),
        };
        let text = format_summary_text(&summary, 7, &plain());
        assert_eq!(text, "Last 7 days: 0 logs\n");
    }

    #[test]
    fn test_summary_text_rows() {
        let summary = SleepSummary {
            stats: ObservationStats {
                avg_pm: 40.0,
                avg_duration_hours: 6.5,
                count: 2,
            },
            recent: vec![(
                "2026-03-01T22:15:09Z".to_string(),
                45.0,
                6.0,
                Some("buruk".to_string()),
                None,
            )],
        };
        let text = format_summary_text(&summary, 7, &plain());
        assert!(text.contains("Last 7 days: 2 logs"));
        assert!(text.contains("40.0 µg/m³ [POOR]"));
        assert!(text.contains("Avg sleep: 6.5 h"));
        assert!(text.contains("2026-03-01T22:15:09Z"));
        assert!(text.contains("buruk"));
    }

    #[test]
    fn test_report_text() {
        let report = AirQualityReport::new("Jakarta, DKI Jakarta, Indonesia", -6.2146, 106.8451, 48.26);
        let text = format_report_text(&report, &plain());
        assert!(text.starts_with("Jakarta, DKI Jakarta, Indonesia\n"));
        assert!(text.contains("48.3 µg/m³ [POOR]"));
        assert!(text.contains("-6.2146, 106.8451"));
        assert!(text.contains("Open-Meteo"));
    }

    #[test]
    fn test_tools_text_lists_every_tool() {
        let text = format_tools_text(&somnair_service::tool_declarations(), &plain());
        for name in somnair_service::tools::TOOL_NAMES {
            assert!(text.contains(name));
        }
    }
}
