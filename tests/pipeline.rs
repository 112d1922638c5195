//! End-to-end health check runs against real files.
//!
//! Each test drives `HealthCheck::run` through a recording sink and checks
//! what was delivered, in which order, and what was persisted.

use logscan::alerts::{AlertManager, NotificationSink};
use logscan::collectors::LogCollector;
use logscan::config::Config;
use logscan::error::AlertError;
use logscan::events::{AlertEvent, Severity};
use logscan::pipeline::{HealthCheck, RunOutcome};
use serde_json::Value;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

/// Sink that keeps every delivered event
#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<AlertEvent>>>,
}

impl RecordingSink {
    fn titles(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.title().to_string())
            .collect()
    }

    fn severities(&self) -> Vec<Severity> {
        self.events.lock().unwrap().iter().map(|e| e.severity()).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send(&self, event: &AlertEvent) -> Result<(), AlertError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn health_check(config: &Config) -> (HealthCheck, RecordingSink) {
    let sink = RecordingSink::default();
    let mut manager = AlertManager::new();
    manager.add_sink(Box::new(sink.clone()));
    (HealthCheck::from_config(config, manager), sink)
}

fn log_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

// ═══════════════════════════════════════════════════════════════════════════
// DELIVERY ORDER
// ═══════════════════════════════════════════════════════════════════════════

/// Two lines, one error: the error rate crosses the critical threshold, the
/// single timestamped hour is a peak, and the summary comes last.
#[test]
fn two_line_file_raises_error_rate_and_peak() {
    let file = log_file(&[
        "2024-01-01 10:00:00 ERROR disk full".to_string(),
        "2024-01-01 10:00:01 INFO ok".to_string(),
    ]);
    let (check, sink) = health_check(&Config::default());

    let outcome = check.run(&LogCollector::new(file.path()));
    let report = outcome.report().expect("run should complete");

    assert_eq!(report.analysis().total(), 2);
    assert_eq!(report.analysis().errors(), 1);
    assert_eq!(report.analysis().error_rate(), 50.0);
    assert_eq!(
        sink.titles(),
        [
            "Critical Error Rate",
            "Peak Activity Detected",
            "System Issues Detected"
        ]
    );
}

/// Many timeout lines without the word "error" raise only a category alert.
#[test]
fn repeated_timeouts_raise_category_alert() {
    let lines: Vec<String> = (0..25)
        .map(|i| format!("upstream request {} timeout", i))
        .collect();
    let file = log_file(&lines);
    let (check, sink) = health_check(&Config::default());

    check.run(&LogCollector::new(file.path()));

    assert_eq!(
        sink.titles(),
        ["Pattern Detected: timeout", "System Status: Healthy"]
    );
    assert_eq!(sink.severities(), [Severity::Error, Severity::Success]);
}

/// Critical lines make the summary an emergency while the error rate stays low.
#[test]
fn critical_lines_escalate_summary() {
    let mut lines: Vec<String> = (0..3).map(|i| format!("kernel panic {}", i)).collect();
    lines.extend((0..4).map(|i| format!("request {} failed", i)));
    lines.extend((0..43).map(|i| format!("request {} served", i)));
    let file = log_file(&lines);
    let (check, sink) = health_check(&Config::default());

    let outcome = check.run(&LogCollector::new(file.path()));

    assert_eq!(outcome.report().unwrap().analysis().critical_count(), 3);
    assert_eq!(sink.titles(), ["CRITICAL ERRORS FOUND", "SYSTEM CRITICAL"]);
    assert_eq!(
        sink.severities(),
        [Severity::Emergency, Severity::Emergency]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// INPUT PROBLEMS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn missing_file_sends_single_warning() {
    let (check, sink) = health_check(&Config::default());

    let outcome = check.run(&LogCollector::new("/nonexistent/system_logs.txt"));

    assert!(matches!(outcome, RunOutcome::NoInput { .. }));
    assert_eq!(sink.titles(), ["Log File Issue"]);
    assert_eq!(sink.severities(), [Severity::Warning]);
}

#[test]
fn blank_file_is_treated_as_missing() {
    let file = log_file(&["".to_string(), "   ".to_string(), "\t".to_string()]);
    let (check, sink) = health_check(&Config::default());

    let outcome = check.run(&LogCollector::new(file.path()));

    assert!(outcome.report().is_none());
    assert_eq!(sink.titles(), ["Log File Issue"]);
}

/// Windows line endings and invalid UTF-8 still produce a full analysis.
#[test]
fn crlf_and_invalid_utf8_are_tolerated() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"09:00:00 ERROR bad byte \xff here\r\n09:30:00 ok\r\n")
        .unwrap();
    file.flush().unwrap();
    let (check, _sink) = health_check(&Config::default());

    let outcome = check.run(&LogCollector::new(file.path()));
    let analysis = outcome.report().unwrap().analysis();

    assert_eq!(analysis.total(), 2);
    assert_eq!(analysis.errors(), 1);
    assert_eq!(analysis.hour_histogram().get("09"), Some(&2));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION AND PERSISTENCE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn startup_notice_and_parallel_workers_from_config() {
    let config = Config::parse(
        "[analysis]\nworkers = 3\n\n[alerts]\nsend_startup_notice = true\n",
    )
    .unwrap();
    let lines: Vec<String> = (0..300)
        .map(|i| format!("{:02}:00:00 line {}", i % 24, i))
        .collect();
    let file = log_file(&lines);
    let (check, sink) = health_check(&config);

    let outcome = check.run(&LogCollector::new(file.path()));
    let analysis = outcome.report().unwrap().analysis();

    assert_eq!(analysis.total(), 300);
    let samples: Vec<u64> = analysis.timeline().iter().map(|s| s.line).collect();
    assert_eq!(samples, [100, 200, 300]);
    assert_eq!(
        sink.titles(),
        ["AIOps System Started", "System Status: Healthy"]
    );
}

#[test]
fn report_is_persisted_as_flat_json() {
    let file = log_file(&[
        "11:00:00 WARNING low disk".to_string(),
        "11:05:00 connection refused".to_string(),
    ]);
    let (check, _sink) = health_check(&Config::default());
    let outcome = check.run(&LogCollector::new(file.path()));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("aiops_results.json");
    outcome.report().unwrap().write_json(&path).unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["warnings"], 1);
    assert_eq!(value["error_types"]["connection"], 1);
    assert_eq!(value["by_hour"]["11"], 2);
    assert_eq!(value["summary"]["title"], "System Status");
    assert_eq!(value["dispatch"]["sent"], 2);
}
