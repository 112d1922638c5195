//! Built-in alert rules
//!
//! Each rule inspects a finished `AnalysisResult` and returns the alert events
//! it fires. Thresholds are exclusive lower bounds throughout.

use crate::aggregator::AnalysisResult;
use crate::events::{AlertEvent, Severity};
use crate::triggers::AlertRule;
use serde::{Deserialize, Serialize};

/// Error rate (percent) above which a critical alert fires
pub const DEFAULT_ERROR_RATE_CRITICAL: f64 = 20.0;
/// Error rate (percent) above which a warning fires
pub const DEFAULT_ERROR_RATE_WARNING: f64 = 10.0;
/// Category count above which a per-category alert fires
pub const DEFAULT_CATEGORY_MIN_COUNT: u64 = 5;
/// Category count above which a per-category alert escalates to error
pub const DEFAULT_CATEGORY_ERROR_COUNT: u64 = 10;
/// Number of top-ranked categories considered for per-category alerts
pub const DEFAULT_CATEGORY_ALERT_LIMIT: usize = 3;
/// Multiple of the average hourly volume a peak hour must exceed
pub const DEFAULT_PEAK_HOUR_FACTOR: f64 = 3.0;

/// Tunable thresholds for the built-in rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub error_rate_critical: f64,
    pub error_rate_warning: f64,
    pub category_min_count: u64,
    pub category_error_count: u64,
    pub category_alert_limit: usize,
    pub peak_hour_factor: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            error_rate_critical: DEFAULT_ERROR_RATE_CRITICAL,
            error_rate_warning: DEFAULT_ERROR_RATE_WARNING,
            category_min_count: DEFAULT_CATEGORY_MIN_COUNT,
            category_error_count: DEFAULT_CATEGORY_ERROR_COUNT,
            category_alert_limit: DEFAULT_CATEGORY_ALERT_LIMIT,
            peak_hour_factor: DEFAULT_PEAK_HOUR_FACTOR,
        }
    }
}

/// Fires when the share of error lines is too high
///
/// Above `critical_threshold` a critical alert is emitted; otherwise, above
/// `warning_threshold`, a warning.
pub struct ErrorRateRule {
    pub critical_threshold: f64,
    pub warning_threshold: f64,
}

impl ErrorRateRule {
    pub fn new(critical_threshold: f64, warning_threshold: f64) -> Self {
        Self {
            critical_threshold,
            warning_threshold,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_ERROR_RATE_CRITICAL, DEFAULT_ERROR_RATE_WARNING)
    }
}

impl AlertRule for ErrorRateRule {
    fn evaluate(&self, result: &AnalysisResult) -> Vec<AlertEvent> {
        let rate = result.error_rate();
        let errors = result.errors();
        let total = result.total();

        if rate > self.critical_threshold {
            vec![AlertEvent::new(
                Severity::Critical,
                "Critical Error Rate",
                format!(
                    "Error rate is {:.1}% ({} errors in {} logs)",
                    rate, errors, total
                ),
            )
            .with_detail("Error Rate", format!("{:.1}%", rate))
            .with_detail("Errors", errors)
            .with_detail("Total Logs", total)
            .with_detail("Threshold", format!("{}%", self.critical_threshold))
            .with_detail("Recommendation", "Check application immediately")]
        } else if rate > self.warning_threshold {
            vec![AlertEvent::new(
                Severity::Warning,
                "High Error Rate",
                format!("Error rate is {:.1}% ({} errors)", rate, errors),
            )
            .with_detail("Error Rate", format!("{:.1}%", rate))
            .with_detail("Errors", errors)
            .with_detail("Total Logs", total)
            .with_detail("Threshold", format!("{}%", self.warning_threshold))]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &str {
        "ErrorRateRule"
    }
}

/// Fires an emergency whenever any critical line was seen
pub struct CriticalErrorsRule;

impl AlertRule for CriticalErrorsRule {
    fn evaluate(&self, result: &AnalysisResult) -> Vec<AlertEvent> {
        let count = result.critical_count();
        if count == 0 {
            return Vec::new();
        }

        vec![AlertEvent::new(
            Severity::Emergency,
            "CRITICAL ERRORS FOUND",
            format!("Found {} critical errors", count),
        )
        .with_detail("Count", count)
        .with_detail("Action", "IMMEDIATE ATTENTION REQUIRED")]
    }

    fn name(&self) -> &str {
        "CriticalErrorsRule"
    }
}

/// Fires one alert per frequent category among the top-ranked ones
///
/// Only the first `limit` entries of the ranking are considered, so a lower
/// ranked category never fires even if it exceeds `min_count` itself.
pub struct CategoryFrequencyRule {
    pub min_count: u64,
    pub error_count: u64,
    pub limit: usize,
}

impl CategoryFrequencyRule {
    pub fn new(min_count: u64, error_count: u64, limit: usize) -> Self {
        Self {
            min_count,
            error_count,
            limit,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_CATEGORY_MIN_COUNT,
            DEFAULT_CATEGORY_ERROR_COUNT,
            DEFAULT_CATEGORY_ALERT_LIMIT,
        )
    }
}

impl AlertRule for CategoryFrequencyRule {
    fn evaluate(&self, result: &AnalysisResult) -> Vec<AlertEvent> {
        result
            .top_categories()
            .iter()
            .take(self.limit)
            .filter(|&&(_, count)| count > self.min_count)
            .map(|&(category, count)| {
                let severity = if count > self.error_count {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                AlertEvent::new(
                    severity,
                    format!("Pattern Detected: {}", category),
                    format!("Pattern '{}' found {} times", category, count),
                )
                .with_detail("Category", category.as_str())
                .with_detail("Count", count)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "CategoryFrequencyRule"
    }
}

/// Fires when the busiest hour far exceeds the average hourly volume
pub struct PeakHourRule {
    pub factor: f64,
}

impl PeakHourRule {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_PEAK_HOUR_FACTOR)
    }
}

impl AlertRule for PeakHourRule {
    fn evaluate(&self, result: &AnalysisResult) -> Vec<AlertEvent> {
        let Some((hour, count)) = result.peak_hour() else {
            return Vec::new();
        };

        let average = result.total() as f64 / 24.0;
        if count as f64 <= average * self.factor {
            return Vec::new();
        }

        vec![AlertEvent::new(
            Severity::Info,
            "Peak Activity Detected",
            format!("Peak activity at {}:00 ({} logs)", hour, count),
        )
        .with_detail("Hour", hour)
        .with_detail("Count", count)
        .with_detail("Hourly Average", format!("{:.1}", average))]
    }

    fn name(&self) -> &str {
        "PeakHourRule"
    }
}
