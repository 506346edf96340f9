//! Loading experiments and analyses from JSON files
//!
//! The experiment file holds one experiment object; the analyses file holds
//! an array of analyses (any subset of strategies, possibly repeated).

use crate::analysis::{AnalysesByStrategy, Analysis};
use crate::error::{HealthError, Result};
use crate::experiment::Experiment;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| HealthError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| HealthError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an experiment from a JSON file
pub fn load_experiment<P: AsRef<Path>>(path: P) -> Result<Experiment> {
    let experiment: Experiment = read_json(path.as_ref())?;
    tracing::debug!(
        "Loaded experiment {} with {} variations",
        experiment.experiment_id,
        experiment.variations.len()
    );
    Ok(experiment)
}

/// Load a JSON array of analyses and index it by strategy
pub fn load_analyses<P: AsRef<Path>>(path: P) -> Result<AnalysesByStrategy> {
    let analyses: Vec<Analysis> = read_json(path.as_ref())?;
    tracing::debug!("Loaded {} analyses", analyses.len());
    Ok(AnalysesByStrategy::from_analyses(analyses))
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| HealthError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}
