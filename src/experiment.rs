//! Experiment model as supplied by the experiment API
//!
//! Experiments and variations are immutable inputs to the health engine.
//! This module also owns the run-time calculation used by the
//! "Experiment run time" indicator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a variation within an experiment
pub type VariationId = u64;

/// Lifecycle status of an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Being set up, not yet assigning participants
    Staging,
    /// Currently assigning participants
    Running,
    /// Finished normally
    Completed,
    /// Stopped before completion
    Disabled,
}

/// One arm of an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub variation_id: VariationId,
    pub name: String,
    /// Share of traffic allocated to this variation, in percent
    pub allocated_percentage: f64,
    #[serde(default)]
    pub is_default: bool,
}

/// An experiment with its variations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: u64,
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,
    pub variations: Vec<Variation>,
}

impl Experiment {
    /// Sum of all variations' allocated percentages
    pub fn total_allocated_percentage(&self) -> f64 {
        self.variations.iter().map(|v| v.allocated_percentage).sum()
    }

    /// Allocated traffic share of a variation, in `[0, 1]` for consistent input
    ///
    /// Returns NaN when no traffic is allocated at all.
    pub fn allocated_share(&self, variation: &Variation) -> f64 {
        variation.allocated_percentage / self.total_allocated_percentage()
    }
}

/// Number of whole hours the experiment has been running as of `now`
///
/// - Staging experiments and experiments without a start have run 0 hours.
/// - Completed and disabled experiments are measured up to their end
///   datetime (or `now` when the end is missing).
/// - Running experiments are measured up to `now`.
///
/// A start in the future yields a negative value; it is not clamped.
pub fn run_hours(experiment: &Experiment, now: DateTime<Utc>) -> f64 {
    let Some(start) = experiment.start_datetime else {
        return 0.0;
    };

    let end = match experiment.status {
        Status::Staging => return 0.0,
        Status::Running => now,
        Status::Completed | Status::Disabled => experiment.end_datetime.unwrap_or(now),
    };

    (end - start).num_hours() as f64
}

/// Experiment run time in days (`run_hours / 24`)
pub fn run_days(experiment: &Experiment, now: DateTime<Utc>) -> f64 {
    run_hours(experiment, now) / 24.0
}
