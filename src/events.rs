//! Alert event types shared by the alert engine, summary builder and sinks
//!
//! Alert events are produced as plain values and never mutated afterwards.
//! Presentation concerns (colors, emoji, payload shape) belong to the sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// Severity level for alert events
///
/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational event, no action required
    Info,
    /// Positive outcome, e.g. a clean run
    Success,
    /// Something may require attention
    Warning,
    /// A problem that should be investigated
    Error,
    /// A serious problem requiring prompt attention
    Critical,
    /// The system is in a critical state right now
    Emergency,
}

impl Severity {
    /// All severities in ascending order
    pub const ALL: [Severity; 6] = [
        Severity::Info,
        Severity::Success,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Emergency,
    ];

    /// Lowercase name, as used in serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
            Severity::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named detail attached to an alert event
///
/// Values are either scalars or nested structures, so they are kept as JSON values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailField {
    pub name: String,
    pub value: Value,
}

/// Structured alert event destined for a notification sink
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertEvent {
    severity: Severity,
    title: String,
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    details: Vec<DetailField>,
}

impl AlertEvent {
    /// Create an event without detail fields
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Append a detail field, keeping insertion order
    pub fn with_detail(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.push(DetailField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Detail fields in the order they were attached
    pub fn details(&self) -> &[DetailField] {
        &self.details
    }

    /// Look up a detail value by name
    pub fn detail(&self, name: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
}
