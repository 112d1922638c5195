/// Alert engine and rule implementations
pub mod trigger_engine;
pub mod rules;

pub use rules::{
    AlertThresholds, CategoryFrequencyRule, CriticalErrorsRule, ErrorRateRule, PeakHourRule,
};
pub use trigger_engine::{AlertEngine, AlertRule};
