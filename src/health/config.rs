// Configuration for health indicator thresholds
//
// Defaults reproduce the standard bracket sets. A TOML file may override any
// subset of thresholds; omitted sections keep their defaults.

use crate::error::{HealthError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Thresholds for allocation p-value indicators
///
/// p ≤ `probable_issue_max` is an error, p ≤ `possible_issue_max` a warning,
/// anything up to 1 is nominal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PvalueThresholds {
    pub probable_issue_max: f64,
    pub possible_issue_max: f64,
}

impl Default for PvalueThresholds {
    fn default() -> Self {
        Self {
            probable_issue_max: 0.001,
            possible_issue_max: 0.05,
        }
    }
}

/// Thresholds for ratio indicators (share of assigned participants)
///
/// ratio ≤ `nominal_max` is nominal, ratio ≤ `high_max` a warning, anything
/// up to 1 an error. Defaults differ per ratio; a TOML section overrides only
/// the values it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioThresholds {
    pub nominal_max: f64,
    pub high_max: f64,
}

impl RatioThresholds {
    pub fn crossovers() -> Self {
        Self {
            nominal_max: 0.01,
            high_max: 0.05,
        }
    }

    pub fn spammers() -> Self {
        Self {
            nominal_max: 0.1,
            high_max: 0.4,
        }
    }
}

/// Ratio section as written in TOML, every value optional
#[derive(Deserialize)]
struct RatioOverrides {
    nominal_max: Option<f64>,
    high_max: Option<f64>,
}

impl RatioOverrides {
    fn apply(self, defaults: RatioThresholds) -> RatioThresholds {
        RatioThresholds {
            nominal_max: self.nominal_max.unwrap_or(defaults.nominal_max),
            high_max: self.high_max.unwrap_or(defaults.high_max),
        }
    }
}

fn crossovers_ratio<'de, D>(deserializer: D) -> std::result::Result<RatioThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    RatioOverrides::deserialize(deserializer).map(|o| o.apply(RatioThresholds::crossovers()))
}

fn spammers_ratio<'de, D>(deserializer: D) -> std::result::Result<RatioThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    RatioOverrides::deserialize(deserializer).map(|o| o.apply(RatioThresholds::spammers()))
}

/// Thresholds for the experiment run time, in days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunTimeThresholds {
    pub very_low_max: f64,
    pub low_max: f64,
    pub nominal_max: f64,
    pub high_max: f64,
}

impl Default for RunTimeThresholds {
    fn default() -> Self {
        Self {
            very_low_max: 3.0,
            low_max: 7.0,
            nominal_max: 28.0,
            high_max: 42.0,
        }
    }
}

/// Configuration for health indicator classification
///
/// # Example
/// ```
/// use experiment_health::health::HealthConfig;
///
/// let config = HealthConfig::default();
/// assert_eq!(config.assignment_pvalue.possible_issue_max, 0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Brackets for every "Assignment distribution" indicator
    pub assignment_pvalue: PvalueThresholds,

    /// Brackets for "Ratio of crossovers to assigned"
    #[serde(
        default = "RatioThresholds::crossovers",
        deserialize_with = "crossovers_ratio"
    )]
    pub crossovers_ratio: RatioThresholds,

    /// Brackets for "Ratio of spammers to assigned"
    #[serde(
        default = "RatioThresholds::spammers",
        deserialize_with = "spammers_ratio"
    )]
    pub spammers_ratio: RatioThresholds,

    /// Brackets for "Experiment run time"
    pub run_time_days: RunTimeThresholds,

    /// Base URL of the health documentation; indicators link to
    /// `<docs_base_url>#<anchor>` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_base_url: Option<String>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            assignment_pvalue: PvalueThresholds::default(),
            crossovers_ratio: RatioThresholds::crossovers(),
            spammers_ratio: RatioThresholds::spammers(),
            run_time_days: RunTimeThresholds::default(),
            docs_base_url: None,
        }
    }
}

impl HealthConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: HealthConfig = toml::from_str(contents)?;
        config.validate().map_err(HealthError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| HealthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        check_ascending(
            "assignment_pvalue",
            &[
                self.assignment_pvalue.probable_issue_max,
                self.assignment_pvalue.possible_issue_max,
                1.0,
            ],
        )?;
        check_ascending(
            "crossovers_ratio",
            &[
                self.crossovers_ratio.nominal_max,
                self.crossovers_ratio.high_max,
                1.0,
            ],
        )?;
        check_ascending(
            "spammers_ratio",
            &[
                self.spammers_ratio.nominal_max,
                self.spammers_ratio.high_max,
                1.0,
            ],
        )?;
        check_ascending(
            "run_time_days",
            &[
                self.run_time_days.very_low_max,
                self.run_time_days.low_max,
                self.run_time_days.nominal_max,
                self.run_time_days.high_max,
            ],
        )?;

        for (name, value) in [
            (
                "assignment_pvalue.probable_issue_max",
                self.assignment_pvalue.probable_issue_max,
            ),
            ("crossovers_ratio.nominal_max", self.crossovers_ratio.nominal_max),
            ("spammers_ratio.nominal_max", self.spammers_ratio.nominal_max),
        ] {
            if value < 0.0 {
                return Err(format!("{} must be in [0, 1], got {}", name, value));
            }
        }

        if let Some(url) = &self.docs_base_url {
            if url.trim().is_empty() {
                return Err("docs_base_url must not be empty".to_string());
            }
        }

        Ok(())
    }
}

fn check_ascending(name: &str, bounds: &[f64]) -> std::result::Result<(), String> {
    if let Some(bad) = bounds.iter().find(|b| !b.is_finite()) {
        return Err(format!("{} thresholds must be finite, got {}", name, bad));
    }
    if bounds.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(format!(
            "{} thresholds must be strictly ascending, got {:?}",
            name, bounds
        ));
    }
    Ok(())
}
