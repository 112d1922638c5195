use crate::aggregator::AnalysisResult;
use crate::events::AlertEvent;
use crate::triggers::rules::{
    AlertThresholds, CategoryFrequencyRule, CriticalErrorsRule, ErrorRateRule, PeakHourRule,
};
use log::debug;

/// Engine that turns a finished analysis into an ordered list of alert events
///
/// Rules are evaluated in the order they were added and their events are
/// concatenated in that order. The engine only reads the analysis result and
/// never talks to a notification sink.
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
}

/// Trait for rules that derive alert events from an analysis result
pub trait AlertRule: Send + Sync {
    /// Evaluate the rule, returning zero or more events in emission order
    fn evaluate(&self, result: &AnalysisResult) -> Vec<AlertEvent>;

    /// Get a human-readable name for this rule
    fn name(&self) -> &str;
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::with_thresholds(&AlertThresholds::default())
    }
}

impl AlertEngine {
    /// Create an alert engine with no rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine with the built-in rule set in its fixed order:
    /// error rate, critical errors, per-category frequency, peak hour
    pub fn with_thresholds(thresholds: &AlertThresholds) -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(ErrorRateRule::new(
            thresholds.error_rate_critical,
            thresholds.error_rate_warning,
        )));
        engine.add_rule(Box::new(CriticalErrorsRule));
        engine.add_rule(Box::new(CategoryFrequencyRule::new(
            thresholds.category_min_count,
            thresholds.category_error_count,
            thresholds.category_alert_limit,
        )));
        engine.add_rule(Box::new(PeakHourRule::new(thresholds.peak_hour_factor)));
        engine
    }

    /// Add an alert rule to the end of the evaluation order
    pub fn add_rule(&mut self, rule: Box<dyn AlertRule>) {
        self.rules.push(rule);
    }

    /// Evaluate all rules against an analysis result
    pub fn evaluate(&self, result: &AnalysisResult) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for rule in &self.rules {
            let fired = rule.evaluate(result);
            if !fired.is_empty() {
                debug!("Rule '{}' produced {} alert(s)", rule.name(), fired.len());
            }
            events.extend(fired);
        }

        events
    }

    /// Get the number of configured rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
