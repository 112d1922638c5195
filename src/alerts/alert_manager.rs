use crate::alerts::NotificationSink;
use crate::events::AlertEvent;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// One failed delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryFailure {
    /// Name of the sink that failed
    pub sink: String,
    /// Title of the event that was not delivered
    pub title: String,
    /// Error description
    pub error: String,
}

/// Outcome of dispatching a batch of events
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DispatchReport {
    /// Number of successful (event, sink) deliveries
    pub sent: usize,
    /// Failed deliveries, in attempt order
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Fold another report into this one
    pub fn absorb(&mut self, other: DispatchReport) {
        self.sent += other.sent;
        self.failures.extend(other.failures);
    }
}

/// Delivers alert events to every configured notification sink
///
/// Each (event, sink) attempt is independent: a failure is logged and
/// recorded in the returned report, and dispatch continues with the next
/// attempt. Events are delivered in the order given.
#[derive(Default)]
pub struct AlertManager {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl AlertManager {
    /// Create an alert manager with no sinks
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink; events go to sinks in the order they were added
    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        info!("Registered notification sink: {}", sink.name());
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Send one event to every sink
    pub fn send_alert(&self, event: &AlertEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        if self.sinks.is_empty() {
            warn!("No notification sinks configured, dropping '{}'", event.title());
            return report;
        }

        for sink in &self.sinks {
            match sink.send(event) {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    error!(
                        "Failed to send '{}' via {}: {}",
                        event.title(),
                        sink.name(),
                        e
                    );
                    report.failures.push(DeliveryFailure {
                        sink: sink.name().to_string(),
                        title: event.title().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Send a batch of events in order
    pub fn dispatch(&self, events: &[AlertEvent]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for event in events {
            report.absorb(self.send_alert(event));
        }

        if report.failed() > 0 {
            warn!(
                "Dispatched {} notification(s), {} failed",
                report.sent,
                report.failed()
            );
        } else {
            info!("Dispatched {} notification(s)", report.sent);
        }
        report
    }
}
