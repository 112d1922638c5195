/// Line source for log files and standard input
pub mod log_collector;

pub use log_collector::LogCollector;
