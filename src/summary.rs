//! Overall health summary for one analysis run

use crate::aggregator::AnalysisResult;
use crate::events::{AlertEvent, Severity};
use serde_json::{json, Value};

/// Number of ranked categories listed in the summary details
pub const SUMMARY_TOP_CATEGORIES: usize = 3;

/// Marker used when no line carried a timestamp
pub const NO_PEAK_HOUR: &str = "none";

/// Build the single health digest event for an analysis result
///
/// Precedence: any critical line makes the run an emergency, then errors give
/// a warning, then warnings alone give info; a clean run is a success.
pub fn summarize(result: &AnalysisResult) -> AlertEvent {
    let total = result.total();
    let errors = result.errors();
    let warnings = result.warnings();
    let critical = result.critical_count();

    let event = if critical > 0 {
        AlertEvent::new(
            Severity::Emergency,
            "SYSTEM CRITICAL",
            format!(
                "{} CRITICAL errors found! {} total errors in {} logs.",
                critical, errors, total
            ),
        )
    } else if errors > 0 {
        AlertEvent::new(
            Severity::Warning,
            "System Issues Detected",
            format!(
                "Found {} errors and {} warnings in {} logs.",
                errors, warnings, total
            ),
        )
    } else if warnings > 0 {
        AlertEvent::new(
            Severity::Info,
            "System Status",
            format!("{} logs analyzed with {} warnings.", total, warnings),
        )
    } else {
        AlertEvent::new(
            Severity::Success,
            "System Status: Healthy",
            format!("All clear! {} logs analyzed with no errors.", total),
        )
    };

    let top: Vec<Value> = result
        .top_categories()
        .iter()
        .take(SUMMARY_TOP_CATEGORIES)
        .map(|&(category, count)| json!([category.as_str(), count]))
        .collect();

    let peak_hour = result
        .peak_hour()
        .map(|(hour, _)| hour.to_string())
        .unwrap_or_else(|| NO_PEAK_HOUR.to_string());

    event
        .with_detail("Total Logs", total)
        .with_detail("Errors", errors)
        .with_detail("Warnings", warnings)
        .with_detail("Critical Errors", critical)
        .with_detail("Error Rate", format!("{:.1}%", result.error_rate()))
        .with_detail("Top Error Types", Value::Array(top))
        .with_detail("Peak Hour", peak_hour)
}

/// Event reported when the line source produced nothing to analyze
pub fn no_input(source: &str) -> AlertEvent {
    AlertEvent::new(
        Severity::Warning,
        "Log File Issue",
        "No log file found or empty logs.",
    )
    .with_detail("Source", source)
}

/// Event announcing that a health check run has started
pub fn startup_notice(channel: Option<&str>) -> AlertEvent {
    let event = AlertEvent::new(
        Severity::Success,
        "AIOps System Started",
        "AIOps system is online and monitoring logs.",
    )
    .with_detail("Status", "Operational");

    match channel {
        Some(channel) => event.with_detail("Channel", channel),
        None => event,
    }
}
