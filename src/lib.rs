/// Error types for each collaborator boundary
pub mod error;

/// Shared event types: severities and alert events
pub mod events;

/// Built-in category patterns
pub mod patterns;

/// Line classification against the pattern registry
pub mod classifier;

/// Line source for files and stdin
pub mod collectors;

/// Batch analysis into an aggregated result
pub mod aggregator;

/// Alert rules evaluated against an analysis result
pub mod triggers;

/// Health summary events
pub mod summary;

/// Notification sinks and the alert manager
pub mod alerts;

/// Configuration management
pub mod config;

/// Run report persistence
pub mod report;

/// End-to-end health check run
pub mod pipeline;

// Re-export commonly used types
pub use aggregator::{AnalysisResult, LogAggregator};
pub use classifier::Classifier;
pub use error::{AlertError, CollectorError, ConfigError, ReportError};
pub use events::{AlertEvent, Severity};
pub use patterns::{Category, PatternRegistry};
pub use pipeline::{HealthCheck, RunOptions, RunOutcome};
pub use report::RunReport;
