//! Persisted outcome of one health check run

use crate::aggregator::AnalysisResult;
use crate::alerts::DispatchReport;
use crate::error::ReportError;
use crate::events::{AlertEvent, Timestamp};
use chrono::Utc;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Result of a completed run
///
/// Serializes with the analysis fields at the top level so the file reads
/// like a plain analysis result with a few extra keys.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    #[serde(flatten)]
    analysis: AnalysisResult,
    generated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    alerts: Option<Vec<AlertEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<AlertEvent>,
    dispatch: DispatchReport,
}

impl RunReport {
    pub fn new(
        analysis: AnalysisResult,
        alerts: Vec<AlertEvent>,
        summary: AlertEvent,
        dispatch: DispatchReport,
    ) -> Self {
        Self {
            analysis,
            generated_at: Utc::now(),
            alerts: Some(alerts),
            summary: Some(summary),
            dispatch,
        }
    }

    /// Drop alert and summary events from the persisted form
    pub fn without_events(mut self) -> Self {
        self.alerts = None;
        self.summary = None;
        self
    }

    pub fn analysis(&self) -> &AnalysisResult {
        &self.analysis
    }

    pub fn alerts(&self) -> &[AlertEvent] {
        self.alerts.as_deref().unwrap_or(&[])
    }

    pub fn summary(&self) -> Option<&AlertEvent> {
        self.summary.as_ref()
    }

    pub fn dispatch(&self) -> &DispatchReport {
        &self.dispatch
    }

    /// Write the report as pretty-printed JSON, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns `ReportError::IoError` if the file cannot be written and
    /// `ReportError::SerializeError` if serialization fails.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!("Results saved to {}", path.display());
        Ok(())
    }
}
