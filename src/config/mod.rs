//! Configuration loading and validation
//!
//! Configuration is read from a TOML file. Every section and field has a
//! default, so an empty file is a valid configuration.

use crate::alerts::SlackConfig;
use crate::collectors::log_collector::STDIN_SOURCE;
use crate::error::ConfigError;
use crate::triggers::AlertThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where log lines are read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Log file path, or `-` for stdin
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("system_logs.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of threads used to analyze a batch
    pub workers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Announce the start of each run before analyzing
    pub send_startup_notice: bool,
    /// Also write every alert to the application log
    pub console: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            send_startup_notice: false,
            console: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the JSON run report is written; `None` disables persistence
    pub results_path: Option<PathBuf>,
    /// Include alert and summary events in the report
    pub include_alerts: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: Some(PathBuf::from("aiops_results.json")),
            include_alerts: true,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub analysis: AnalysisConfig,
    pub thresholds: AlertThresholds,
    /// Slack delivery; absent means no webhook notifications
    pub slack: Option<SlackConfig>,
    pub alerts: AlertsConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML for this schema, and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                ConfigError::ParseError(format!("{} is not valid UTF-8", path.display()))
            }
            _ => ConfigError::ReadError(format!("{}: {}", path.display(), e)),
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "source.path must not be empty".to_string(),
            ));
        }

        if self.analysis.workers == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.workers must be at least 1".to_string(),
            ));
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("error_rate_critical", t.error_rate_critical),
            ("error_rate_warning", t.error_rate_warning),
            ("peak_hour_factor", t.peak_hour_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "thresholds.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if t.error_rate_warning > t.error_rate_critical {
            return Err(ConfigError::ValidationError(format!(
                "thresholds.error_rate_warning ({}) exceeds error_rate_critical ({})",
                t.error_rate_warning, t.error_rate_critical
            )));
        }
        if t.category_min_count > t.category_error_count {
            return Err(ConfigError::ValidationError(format!(
                "thresholds.category_min_count ({}) exceeds category_error_count ({})",
                t.category_min_count, t.category_error_count
            )));
        }

        if let Some(slack) = &self.slack {
            if !(slack.webhook_url.starts_with("https://")
                || slack.webhook_url.starts_with("http://"))
            {
                return Err(ConfigError::ValidationError(
                    "slack.webhook_url must be an http(s) URL".to_string(),
                ));
            }
            if slack.timeout_seconds == 0 {
                return Err(ConfigError::ValidationError(
                    "slack.timeout_seconds must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Whether lines are read from standard input
    pub fn reads_stdin(&self) -> bool {
        self.source.path.as_os_str() == STDIN_SOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.source.path, PathBuf::from("system_logs.txt"));
        assert_eq!(config.analysis.workers, 1);
        assert!(config.slack.is_none());
        assert_eq!(
            config.output.results_path,
            Some(PathBuf::from("aiops_results.json"))
        );
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r##"
            [source]
            path = "/var/log/app.log"

            [analysis]
            workers = 4

            [thresholds]
            error_rate_critical = 25.0
            peak_hour_factor = 2.5

            [slack]
            webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"
            channel = "#ops"

            [alerts]
            send_startup_notice = true

            [output]
            include_alerts = false
            "##,
        )
        .unwrap();

        assert_eq!(config.source.path, PathBuf::from("/var/log/app.log"));
        assert_eq!(config.analysis.workers, 4);
        assert_eq!(config.thresholds.error_rate_critical, 25.0);
        assert_eq!(config.thresholds.error_rate_warning, 10.0);
        assert_eq!(config.thresholds.peak_hour_factor, 2.5);

        let slack = config.slack.unwrap();
        assert_eq!(slack.channel, "#ops");
        assert_eq!(slack.username, "AIOps Bot");
        assert_eq!(slack.timeout_seconds, 5);

        assert!(config.alerts.send_startup_notice);
        assert!(config.alerts.console);
        assert!(!config.output.include_alerts);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\nworkers = 2").unwrap();
        file.flush().unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.analysis.workers, 2);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Config::from_file(Path::new("/nonexistent/logscan.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_non_utf8_file_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        file.flush().unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::parse("[analysis\nworkers = ");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            "[analysis]\nworkers = 0",
            "[thresholds]\nerror_rate_warning = 30.0",
            "[thresholds]\npeak_hour_factor = -1.0",
            "[thresholds]\ncategory_min_count = 20",
            "[slack]\nwebhook_url = \"\"",
            "[slack]\nwebhook_url = \"https://example.com\"\ntimeout_seconds = 0",
        ];

        for case in cases {
            assert!(
                matches!(Config::parse(case), Err(ConfigError::ValidationError(_))),
                "expected validation error for {:?}",
                case
            );
        }
    }

    #[test]
    fn test_reads_stdin() {
        let config = Config::parse("[source]\npath = \"-\"").unwrap();
        assert!(config.reads_stdin());
        assert!(!Config::default().reads_stdin());
    }
}
