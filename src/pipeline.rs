//! One-shot health check: read, analyze, alert, summarize
//!
//! The run is strictly sequential from the caller's point of view. Alerts are
//! dispatched in rule order and the summary always goes out last.

use crate::aggregator::LogAggregator;
use crate::alerts::{AlertManager, DispatchReport};
use crate::collectors::LogCollector;
use crate::config::Config;
use crate::patterns::PatternRegistry;
use crate::report::RunReport;
use crate::summary;
use crate::triggers::AlertEngine;
use log::{debug, info, warn};

/// Knobs that shape a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Threads used for analysis; 1 means sequential
    pub workers: usize,
    /// Announce the run before reading input
    pub send_startup_notice: bool,
    /// Keep alert and summary events in the returned report
    pub include_alerts: bool,
    /// Channel named in the startup notice
    pub channel: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            send_startup_notice: false,
            include_alerts: true,
            channel: None,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.analysis.workers.max(1),
            send_startup_notice: config.alerts.send_startup_notice,
            include_alerts: config.output.include_alerts,
            channel: config.slack.as_ref().map(|slack| slack.channel.clone()),
        }
    }
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Input was analyzed and every alert dispatched
    Completed(RunReport),
    /// The source was missing or held no non-blank lines
    NoInput {
        source: String,
        dispatch: DispatchReport,
    },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::NoInput { .. } => None,
        }
    }

    pub fn dispatch(&self) -> &DispatchReport {
        match self {
            RunOutcome::Completed(report) => report.dispatch(),
            RunOutcome::NoInput { dispatch, .. } => dispatch,
        }
    }
}

/// Wires the pattern registry, alert engine and alert manager into a run
pub struct HealthCheck {
    registry: PatternRegistry,
    engine: AlertEngine,
    manager: AlertManager,
    options: RunOptions,
}

impl HealthCheck {
    pub fn new(
        registry: PatternRegistry,
        engine: AlertEngine,
        manager: AlertManager,
        options: RunOptions,
    ) -> Self {
        Self {
            registry,
            engine,
            manager,
            options,
        }
    }

    /// Build a health check with the built-in patterns and configured rules
    pub fn from_config(config: &Config, manager: AlertManager) -> Self {
        Self::new(
            PatternRegistry::builtin(),
            AlertEngine::with_thresholds(&config.thresholds),
            manager,
            RunOptions::from_config(config),
        )
    }

    /// Run against a line source
    ///
    /// A source that cannot be read is treated the same as an empty one:
    /// a "Log File Issue" warning is dispatched and no analysis happens.
    pub fn run(&self, collector: &LogCollector) -> RunOutcome {
        let source = collector.source_name();
        let mut dispatch = self.announce();

        let lines = match collector.collect_lines() {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Could not read {}: {}", source, e);
                Vec::new()
            }
        };

        self.process(&lines, &source, &mut dispatch)
            .unwrap_or_else(|| RunOutcome::NoInput { source, dispatch })
    }

    /// Run against lines that are already in memory
    pub fn run_lines<S>(&self, lines: &[S], source: &str) -> RunOutcome
    where
        S: AsRef<str> + Sync,
    {
        let mut dispatch = self.announce();
        self.process(lines, source, &mut dispatch)
            .unwrap_or_else(|| RunOutcome::NoInput {
                source: source.to_string(),
                dispatch,
            })
    }

    fn announce(&self) -> DispatchReport {
        if !self.options.send_startup_notice {
            return DispatchReport::default();
        }
        let notice = summary::startup_notice(self.options.channel.as_deref());
        self.manager.send_alert(&notice)
    }

    /// Analyze and dispatch; `None` when there was nothing to analyze
    ///
    /// The no-input warning is dispatched here so both entry points share it.
    fn process<S>(
        &self,
        lines: &[S],
        source: &str,
        dispatch: &mut DispatchReport,
    ) -> Option<RunOutcome>
    where
        S: AsRef<str> + Sync,
    {
        if lines.iter().all(|line| line.as_ref().trim().is_empty()) {
            warn!("No log lines to analyze from {}", source);
            dispatch.absorb(self.manager.send_alert(&summary::no_input(source)));
            return None;
        }

        let aggregator = LogAggregator::new(&self.registry);
        let analysis = if self.options.workers > 1 {
            aggregator.analyze_parallel(lines, self.options.workers)
        } else {
            aggregator.analyze(lines)
        };
        info!(
            "Analyzed {} logs: {} errors, {} warnings, {} critical",
            analysis.total(),
            analysis.errors(),
            analysis.warnings(),
            analysis.critical_count()
        );

        let alerts = self.engine.evaluate(&analysis);
        debug!("{} alert(s) raised", alerts.len());
        let digest = summary::summarize(&analysis);

        dispatch.absorb(self.manager.dispatch(&alerts));
        dispatch.absorb(self.manager.send_alert(&digest));

        let report = RunReport::new(analysis, alerts, digest, std::mem::take(dispatch));
        let report = if self.options.include_alerts {
            report
        } else {
            report.without_events()
        };
        Some(RunOutcome::Completed(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::sink::MockNotificationSink;
    use crate::error::AlertError;
    use crate::events::{AlertEvent, Severity};
    use mockall::predicate::function;
    use mockall::Sequence;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn health_check(sink: MockNotificationSink, options: RunOptions) -> HealthCheck {
        let mut manager = AlertManager::new();
        manager.add_sink(Box::new(sink));
        HealthCheck::new(
            PatternRegistry::builtin(),
            AlertEngine::default(),
            manager,
            options,
        )
    }

    fn expect_titles(sink: &mut MockNotificationSink, titles: &[&'static str]) {
        let mut seq = Sequence::new();
        for &title in titles {
            sink.expect_send()
                .with(function(move |e: &AlertEvent| e.title() == title))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }
    }

    #[test]
    fn test_alerts_then_summary() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        expect_titles(
            &mut sink,
            &["Critical Error Rate", "CRITICAL ERRORS FOUND", "SYSTEM CRITICAL"],
        );

        let check = health_check(sink, RunOptions::default());
        let lines = ["kernel panic", "ERROR disk", "ok", "ok"];
        let outcome = check.run_lines(&lines, "memory");

        let report = outcome.report().unwrap();
        assert_eq!(report.analysis().total(), 4);
        assert_eq!(report.alerts().len(), 2);
        assert_eq!(report.summary().unwrap().severity(), Severity::Emergency);
        assert_eq!(report.dispatch().sent, 3);
    }

    #[test]
    fn test_healthy_run_sends_only_summary() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        expect_titles(&mut sink, &["System Status: Healthy"]);

        let check = health_check(sink, RunOptions::default());
        let outcome = check.run_lines(&["all good", "still good"], "memory");

        assert!(outcome.report().unwrap().alerts().is_empty());
        assert_eq!(outcome.dispatch().sent, 1);
    }

    #[test]
    fn test_startup_notice_goes_first() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        expect_titles(&mut sink, &["AIOps System Started", "System Status: Healthy"]);

        let options = RunOptions {
            send_startup_notice: true,
            channel: Some("#ops".to_string()),
            ..RunOptions::default()
        };
        let check = health_check(sink, options);
        let outcome = check.run_lines(&["fine"], "memory");
        assert_eq!(outcome.dispatch().sent, 2);
    }

    #[test]
    fn test_blank_input_reports_log_file_issue() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        expect_titles(&mut sink, &["Log File Issue"]);

        let check = health_check(sink, RunOptions::default());
        let outcome = check.run_lines(&["", "   "], "blank.log");

        match outcome {
            RunOutcome::NoInput { source, dispatch } => {
                assert_eq!(source, "blank.log");
                assert_eq!(dispatch.sent, 1);
            }
            RunOutcome::Completed(_) => panic!("expected no input"),
        }
    }

    #[test]
    fn test_missing_file_reports_log_file_issue() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        sink.expect_send()
            .with(function(|e: &AlertEvent| {
                e.title() == "Log File Issue" && e.severity() == Severity::Warning
            }))
            .times(1)
            .returning(|_| Ok(()));

        let check = health_check(sink, RunOptions::default());
        let outcome = check.run(&LogCollector::new("/nonexistent/system_logs.txt"));
        assert!(outcome.report().is_none());
    }

    #[test]
    fn test_run_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2024-01-01 09:15:00 WARNING slow response").unwrap();
        writeln!(file, "2024-01-01 09:16:00 request ok").unwrap();
        file.flush().unwrap();

        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        expect_titles(&mut sink, &["Peak Activity Detected", "System Status"]);

        let check = health_check(sink, RunOptions::default());
        let outcome = check.run(&LogCollector::new(file.path()));

        let report = outcome.report().unwrap();
        assert_eq!(report.analysis().warnings(), 1);
        assert_eq!(report.summary().unwrap().severity(), Severity::Info);
    }

    #[test]
    fn test_delivery_failures_are_recorded() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("flaky");
        sink.expect_send()
            .returning(|_| Err(AlertError::NotificationFailed("down".to_string())));

        let check = health_check(sink, RunOptions::default());
        let outcome = check.run_lines(&["ok"], "memory");

        assert!(outcome.report().is_some());
        assert_eq!(outcome.dispatch().sent, 0);
        assert_eq!(outcome.dispatch().failed(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let lines: Vec<String> = (0..250)
            .map(|i| match i % 5 {
                0 => format!("12:00:{:02} ERROR failed to connect", i % 60),
                1 => format!("13:00:{:02} warning: slow", i % 60),
                2 => String::new(),
                _ => format!("14:00:{:02} ok", i % 60),
            })
            .collect();

        let run = |workers: usize| {
            let mut sink = MockNotificationSink::new();
            sink.expect_name().return_const("mock");
            sink.expect_send().returning(|_| Ok(()));
            let options = RunOptions {
                workers,
                ..RunOptions::default()
            };
            health_check(sink, options).run_lines(&lines, "memory")
        };

        let sequential = run(1);
        let parallel = run(4);
        assert_eq!(
            sequential.report().unwrap().analysis(),
            parallel.report().unwrap().analysis()
        );
    }

    #[test]
    fn test_exclude_alerts_from_report() {
        let mut sink = MockNotificationSink::new();
        sink.expect_name().return_const("mock");
        sink.expect_send().times(2).returning(|_| Ok(()));

        let options = RunOptions {
            include_alerts: false,
            ..RunOptions::default()
        };
        let check = health_check(sink, options);
        let outcome = check.run_lines(&["fatal: boom"], "memory");

        let report = outcome.report().unwrap();
        assert!(report.alerts().is_empty());
        assert!(report.summary().is_none());
        assert_eq!(report.dispatch().sent, 2);
    }

    #[test]
    fn test_options_from_config() {
        let config = Config::parse(
            "[analysis]\nworkers = 3\n[alerts]\nsend_startup_notice = true\n\
             [slack]\nwebhook_url = \"https://example.com/hook\"\nchannel = \"#x\"",
        )
        .unwrap();

        let options = RunOptions::from_config(&config);
        assert_eq!(options.workers, 3);
        assert!(options.send_startup_notice);
        assert_eq!(options.channel.as_deref(), Some("#x"));
    }
}
