//! CLI argument parsing for experiment-health

use crate::health::HealthIndicationSeverity;
use crate::input::parse_timestamp;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for health reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Severity at which the process exits with a failure status
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    Warning,
    Error,
}

impl FailOn {
    pub fn threshold(self) -> HealthIndicationSeverity {
        match self {
            FailOn::Warning => HealthIndicationSeverity::Warning,
            FailOn::Error => HealthIndicationSeverity::Error,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "experiment-health")]
#[command(version)]
#[command(about = "Health checks for A/B-test experiments", long_about = None)]
pub struct Cli {
    /// Experiment JSON file (variations, allocation, status, dates)
    #[arg(short, long, value_name = "FILE")]
    pub experiment: PathBuf,

    /// JSON array of per-strategy analyses with participant counts
    #[arg(short, long, value_name = "FILE")]
    pub analyses: PathBuf,

    /// TOML file overriding indicator thresholds
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Evaluate run time as of this RFC 3339 timestamp instead of the current time
    #[arg(long, value_name = "TIMESTAMP", value_parser = parse_timestamp)]
    pub now: Option<DateTime<Utc>>,

    /// Exit with status 2 when any indicator reaches this severity
    #[arg(long = "fail-on", value_enum)]
    pub fail_on: Option<FailOn>,

    /// Enable debug tracing output (to stderr)
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cli_minimal() {
        let cli = Cli::parse_from([
            "experiment-health",
            "--experiment",
            "exp.json",
            "--analyses",
            "analyses.json",
        ]);
        assert_eq!(cli.experiment, PathBuf::from("exp.json"));
        assert_eq!(cli.analyses, PathBuf::from("analyses.json"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
        assert!(cli.now.is_none());
        assert!(cli.fail_on.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_all_options() {
        let cli = Cli::parse_from([
            "experiment-health",
            "-e",
            "exp.json",
            "-a",
            "analyses.json",
            "-c",
            "health.toml",
            "--format",
            "json",
            "--now",
            "2026-05-01T00:00:00Z",
            "--fail-on",
            "warning",
            "--debug",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("health.toml")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(
            cli.now,
            Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(cli.fail_on, Some(FailOn::Warning));
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_rejects_bad_timestamp() {
        let result = Cli::try_parse_from([
            "experiment-health",
            "-e",
            "exp.json",
            "-a",
            "analyses.json",
            "--now",
            "last tuesday",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_inputs() {
        assert!(Cli::try_parse_from(["experiment-health", "-e", "exp.json"]).is_err());
    }

    #[test]
    fn test_fail_on_threshold() {
        assert_eq!(FailOn::Warning.threshold(), HealthIndicationSeverity::Warning);
        assert_eq!(FailOn::Error.threshold(), HealthIndicationSeverity::Error);
    }
}
