use crate::error::AlertError;
use crate::events::AlertEvent;

/// Destination for alert events
///
/// Delivery is best-effort: a failed send is reported through the returned
/// `Result` and never affects the analysis that produced the event.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    /// Short identifier used in logs and dispatch reports
    fn name(&self) -> &'static str;

    /// Deliver one event
    fn send(&self, event: &AlertEvent) -> Result<(), AlertError>;
}
