/// Analysis result model and partition merging
pub mod analysis;
pub mod log_aggregator;

pub use analysis::{AnalysisResult, TimelineSample};
pub use log_aggregator::LogAggregator;
