// Shared fixtures for integration tests
//
// Builds experiment/analysis JSON the way the experiment API delivers it.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Participant counts per strategy: (total, variation 1, variation 2)
pub struct StrategyCounts {
    pub itt_pure: (u64, u64, u64),
    pub mitt_no_crossovers: (u64, u64, u64),
    pub mitt_no_spammers: (u64, u64, u64),
    pub mitt_no_spammers_no_crossovers: (u64, u64, u64),
    pub pp_naive: Option<(u64, u64, u64)>,
}

impl StrategyCounts {
    /// Balanced 50/50 experiment with light filtering and exposure data
    pub fn healthy() -> Self {
        Self {
            itt_pure: (10_000, 5_010, 4_990),
            mitt_no_crossovers: (9_950, 4_985, 4_965),
            mitt_no_spammers: (9_800, 4_910, 4_890),
            mitt_no_spammers_no_crossovers: (9_760, 4_885, 4_875),
            pp_naive: Some((6_000, 3_010, 2_990)),
        }
    }

    /// Sample ratio mismatch: 5,600 vs 4,400 in a 50/50 split
    pub fn sample_ratio_mismatch() -> Self {
        Self {
            itt_pure: (10_000, 5_600, 4_400),
            mitt_no_crossovers: (10_000, 5_600, 4_400),
            mitt_no_spammers: (10_000, 5_600, 4_400),
            mitt_no_spammers_no_crossovers: (10_000, 5_600, 4_400),
            pp_naive: None,
        }
    }
}

pub fn experiment_json(status: &str, start: &str) -> Value {
    json!({
        "experiment_id": 42,
        "name": "checkout_redesign",
        "status": status,
        "start_datetime": start,
        "variations": [
            {"variation_id": 1, "name": "control", "allocated_percentage": 50, "is_default": true},
            {"variation_id": 2, "name": "redesign", "allocated_percentage": 50}
        ]
    })
}

fn analysis_json(strategy: &str, counts: (u64, u64, u64)) -> Value {
    json!({
        "analysis_strategy": strategy,
        "analysis_datetime": "2026-03-10T00:00:00Z",
        "participant_stats": {
            "total": counts.0,
            "variation_1": counts.1,
            "variation_2": counts.2
        }
    })
}

pub fn analyses_json(counts: &StrategyCounts) -> Value {
    let mut analyses = vec![
        analysis_json("itt_pure", counts.itt_pure),
        analysis_json("mitt_no_crossovers", counts.mitt_no_crossovers),
        analysis_json("mitt_no_spammers", counts.mitt_no_spammers),
        analysis_json(
            "mitt_no_spammers_no_crossovers",
            counts.mitt_no_spammers_no_crossovers,
        ),
    ];
    if let Some(pp_naive) = counts.pp_naive {
        analyses.push(analysis_json("pp_naive", pp_naive));
    }
    Value::Array(analyses)
}

/// Input files for one CLI run
pub struct Fixture {
    pub dir: TempDir,
    pub experiment: PathBuf,
    pub analyses: PathBuf,
}

impl Fixture {
    pub fn new(experiment: &Value, analyses: &Value) -> Self {
        let dir = TempDir::new().unwrap();
        let experiment_path = dir.path().join("experiment.json");
        let analyses_path = dir.path().join("analyses.json");
        fs::write(&experiment_path, experiment.to_string()).unwrap();
        fs::write(&analyses_path, analyses.to_string()).unwrap();
        Self {
            dir,
            experiment: experiment_path,
            analyses: analyses_path,
        }
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("health.toml");
        fs::write(&path, contents).unwrap();
        path
    }
}
