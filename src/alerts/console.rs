use crate::alerts::NotificationSink;
use crate::error::AlertError;
use crate::events::{AlertEvent, Severity};
use log::{debug, error, info, warn};

/// Sink that writes alert events to the application log
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn format_line(event: &AlertEvent) -> String {
        format!(
            "[{}] {}: {}",
            event.severity().as_str().to_uppercase(),
            event.title(),
            event.message()
        )
    }
}

impl NotificationSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn send(&self, event: &AlertEvent) -> Result<(), AlertError> {
        let line = Self::format_line(event);
        match event.severity() {
            Severity::Info | Severity::Success => info!("{}", line),
            Severity::Warning => warn!("{}", line),
            Severity::Error | Severity::Critical | Severity::Emergency => error!("{}", line),
        }

        for field in event.details() {
            debug!("  {}: {}", field.name, field.value);
        }

        Ok(())
    }
}
