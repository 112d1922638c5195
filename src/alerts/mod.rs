/// Alert delivery: the sink trait, concrete sinks and the dispatching manager
pub mod alert_manager;
pub mod console;
pub mod sink;
pub mod slack;

pub use alert_manager::{AlertManager, DeliveryFailure, DispatchReport};
pub use console::ConsoleSink;
pub use sink::NotificationSink;
pub use slack::{SlackConfig, SlackSink};
