use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use logscan::alerts::{AlertManager, ConsoleSink, SlackConfig, SlackSink};
use logscan::collectors::LogCollector;
use logscan::config::Config;
use logscan::error::ConfigError;
use logscan::pipeline::{HealthCheck, RunOutcome};
use std::path::PathBuf;

/// Command-line arguments for the log health check
#[derive(Parser)]
#[command(
    name = "logscan",
    about = "Log health check - classify log lines, raise alerts and notify Slack",
    long_about = "Reads a batch of log lines, classifies each line against built-in error \
                  patterns, aggregates counts and an hourly histogram, evaluates alert rules \
                  and delivers alerts plus a health summary to Slack and the console."
)]
struct Cli {
    /// Log file to analyze (`-` for stdin)
    #[arg(value_name = "LOG_FILE", help = "Log file to analyze, overrides [source] path")]
    log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Where to write the JSON results
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Results file path, overrides [output] results_path"
    )]
    output: Option<PathBuf>,

    /// Slack incoming webhook URL
    #[arg(
        long,
        value_name = "URL",
        env = "SLACK_WEBHOOK_URL",
        hide_env_values = true,
        help = "Slack webhook URL, overrides [slack] webhook_url"
    )]
    webhook_url: Option<String>,

    /// Skip Slack delivery
    #[arg(long, help = "Only log alerts to the console, never post to Slack")]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!("Output path is a directory: {}", output.display()));
            }
        }

        Ok(())
    }

    /// Apply command-line overrides on top of file configuration
    fn apply_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(ref log_file) = self.log_file {
            config.source.path = log_file.clone();
        }

        if let Some(ref output) = self.output {
            config.output.results_path = Some(output.clone());
        }

        if let Some(ref url) = self.webhook_url {
            config
                .slack
                .get_or_insert_with(SlackConfig::default)
                .webhook_url = url.clone();
        }

        config.validate()
    }
}

/// Load configuration, falling back to defaults when the file is missing or invalid
fn load_config(config_path: Option<&PathBuf>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::ReadError(_)) => {
                    warn!(
                        "Configuration file '{}' not found or unreadable, using defaults",
                        path.display()
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path.display(), e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

/// Register the notification sinks the configuration asks for
fn build_alert_manager(config: &Config, dry_run: bool) -> anyhow::Result<AlertManager> {
    let mut manager = AlertManager::new();

    match (&config.slack, dry_run) {
        (Some(slack), false) => {
            let sink = SlackSink::new(slack.clone()).context("Failed to create Slack sink")?;
            manager.add_sink(Box::new(sink));
        }
        (Some(_), true) => info!("Dry run: Slack delivery disabled"),
        (None, _) => warn!("No Slack webhook configured, alerts go to the console only"),
    }

    // A dry run with console output off would be silent
    if config.alerts.console || dry_run || manager.sink_count() == 0 {
        manager.add_sink(Box::new(ConsoleSink::new()));
    }

    Ok(manager)
}

/// Plain-text digest printed after the run
fn print_summary(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed(report) => {
            let analysis = report.analysis();
            println!("Total logs:      {}", analysis.total());
            println!("Errors:          {}", analysis.errors());
            println!("Warnings:        {}", analysis.warnings());
            println!("Critical:        {}", analysis.critical_count());
            println!("Error rate:      {:.1}%", analysis.error_rate());
            for (category, count) in analysis.top_categories() {
                println!("  {:<14} {}", category.as_str(), count);
            }
        }
        RunOutcome::NoInput { source, .. } => {
            println!("No log lines to analyze in {}", source);
        }
    }

    let dispatch = outcome.dispatch();
    println!(
        "Notifications:   {} sent, {} failed",
        dispatch.sent,
        dispatch.failed()
    );
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_ref());
    cli.apply_overrides(&mut config)
        .context("Invalid command-line configuration")?;

    let manager = build_alert_manager(&config, cli.dry_run)?;
    let check = HealthCheck::from_config(&config, manager);

    let collector = LogCollector::new(config.source.path.clone());
    info!("Analyzing {}", collector.source_name());
    let outcome = check.run(&collector);

    if let (Some(report), Some(path)) = (outcome.report(), &config.output.results_path) {
        report
            .write_json(path)
            .with_context(|| format!("Failed to save results to {}", path.display()))?;
    }

    print_summary(&outcome);
    Ok(())
}

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("Health check complete");
}
