// Health indicators: named, classified scalar metrics of an experiment
//
// Each indicator pairs a derived value with a bracket set. Indicators are
// returned in a fixed definition order, which display layers rely on.

use crate::experiment::{run_days, Experiment};
use crate::health::brackets::{
    indication_from_brackets, BracketIndication, HealthIndication,
    HealthIndicationCode as Code, HealthIndicationSeverity as Severity, IndicationBracket,
};
use crate::health::config::{HealthConfig, PvalueThresholds, RatioThresholds, RunTimeThresholds};
use crate::health::participant_stats::{ExperimentParticipantStats, VariationProbabilities};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of an indicator's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthIndicatorUnit {
    Pvalue,
    Ratio,
    Days,
}

impl fmt::Display for HealthIndicatorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthIndicatorUnit::Pvalue => "p-value",
            HealthIndicatorUnit::Ratio => "ratio",
            HealthIndicatorUnit::Days => "days",
        };
        f.write_str(label)
    }
}

/// A classified health metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthIndicator {
    pub name: String,
    pub value: f64,
    pub unit: HealthIndicatorUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub indication: HealthIndication,
}

/// Unclassified indicator: what to measure and how to judge it
struct IndicatorDefinition {
    name: &'static str,
    value: f64,
    unit: HealthIndicatorUnit,
    brackets: Vec<IndicationBracket>,
}

impl IndicatorDefinition {
    fn classify(self, config: &HealthConfig) -> HealthIndicator {
        let indication = indication_from_brackets(&self.brackets, self.value);
        tracing::debug!(
            "{} = {} classified as {} ({})",
            self.name,
            self.value,
            indication.code,
            indication.reason
        );

        HealthIndicator {
            name: self.name.to_string(),
            value: self.value,
            unit: self.unit,
            link: docs_link(config, self.name),
            indication,
        }
    }
}

const ALLOCATION_RECOMMENDATION: &str =
    "Check the assignment code and allocation changes; if the cause is unclear, contact the experiment review team.";
const CROSSOVERS_RECOMMENDATION: &str =
    "Check for participants switching between variations, e.g. logged-out users or shared devices.";
const SPAMMERS_RECOMMENDATION: &str =
    "Check for bot traffic or abusive behavior in the experiment population.";
const SHORT_RUN_RECOMMENDATION: &str =
    "Wait for more data before drawing conclusions.";
const LONG_RUN_RECOMMENDATION: &str =
    "Consider concluding the experiment; long runs accumulate drift and crossovers.";

fn pvalue_brackets(thresholds: &PvalueThresholds) -> Vec<IndicationBracket> {
    vec![
        IndicationBracket::new(
            thresholds.probable_issue_max,
            BracketIndication::new(Code::ProbableIssue, Severity::Error)
                .with_recommendation(ALLOCATION_RECOMMENDATION),
        ),
        IndicationBracket::new(
            thresholds.possible_issue_max,
            BracketIndication::new(Code::PossibleIssue, Severity::Warning)
                .with_recommendation(ALLOCATION_RECOMMENDATION),
        ),
        IndicationBracket::new(1.0, BracketIndication::new(Code::Nominal, Severity::Ok)),
    ]
}

fn ratio_brackets(thresholds: &RatioThresholds, recommendation: &str) -> Vec<IndicationBracket> {
    vec![
        IndicationBracket::new(
            thresholds.nominal_max,
            BracketIndication::new(Code::Nominal, Severity::Ok),
        ),
        IndicationBracket::new(
            thresholds.high_max,
            BracketIndication::new(Code::High, Severity::Warning)
                .with_recommendation(recommendation),
        ),
        IndicationBracket::new(
            1.0,
            BracketIndication::new(Code::VeryHigh, Severity::Error)
                .with_recommendation(recommendation),
        ),
    ]
}

// Never escalates past Warning: a run that is too short or too long is a
// caution, not a failure.
fn run_time_brackets(thresholds: &RunTimeThresholds) -> Vec<IndicationBracket> {
    vec![
        IndicationBracket::new(
            thresholds.very_low_max,
            BracketIndication::new(Code::VeryLow, Severity::Warning)
                .with_recommendation(SHORT_RUN_RECOMMENDATION),
        ),
        IndicationBracket::new(
            thresholds.low_max,
            BracketIndication::new(Code::Low, Severity::Warning)
                .with_recommendation(SHORT_RUN_RECOMMENDATION),
        ),
        IndicationBracket::new(
            thresholds.nominal_max,
            BracketIndication::new(Code::Nominal, Severity::Ok),
        ),
        IndicationBracket::new(
            thresholds.high_max,
            BracketIndication::new(Code::High, Severity::Warning)
                .with_recommendation(LONG_RUN_RECOMMENDATION),
        ),
        IndicationBracket::new(
            f64::INFINITY,
            BracketIndication::new(Code::VeryHigh, Severity::Warning)
                .with_recommendation(LONG_RUN_RECOMMENDATION),
        ),
    ]
}

/// Health indicators derived from participant statistics
///
/// Allocation p-values are reduced to their minimum across variations: one
/// variation deviating from its allocation is enough to flag the experiment.
/// The exposed-participants indicator is only emitted when the experiment has
/// exposure data (`exposed_to_assigned` is neither 0 nor NaN).
pub fn experiment_participant_health_indicators(
    stats: &ExperimentParticipantStats,
    config: &HealthConfig,
) -> Vec<HealthIndicator> {
    let min_probabilities = stats
        .probabilities
        .by_variation_id
        .values()
        .copied()
        .fold(VariationProbabilities::infinity(), VariationProbabilities::min);
    let overall = &stats.ratios.overall;

    let mut definitions = vec![
        IndicatorDefinition {
            name: "Assignment distribution",
            value: min_probabilities.assigned,
            unit: HealthIndicatorUnit::Pvalue,
            brackets: pvalue_brackets(&config.assignment_pvalue),
        },
        IndicatorDefinition {
            name: "Assignment distribution without crossovers and spammers",
            value: min_probabilities.assigned_no_spammers_no_crossovers,
            unit: HealthIndicatorUnit::Pvalue,
            brackets: pvalue_brackets(&config.assignment_pvalue),
        },
    ];

    if has_exposure_data(overall.exposed_to_assigned) {
        definitions.push(IndicatorDefinition {
            name: "Assignment distribution of exposed participants",
            value: min_probabilities.exposed,
            unit: HealthIndicatorUnit::Pvalue,
            brackets: pvalue_brackets(&config.assignment_pvalue),
        });
    }

    definitions.push(IndicatorDefinition {
        name: "Ratio of crossovers to assigned",
        value: overall.assigned_crossovers_to_assigned,
        unit: HealthIndicatorUnit::Ratio,
        brackets: ratio_brackets(&config.crossovers_ratio, CROSSOVERS_RECOMMENDATION),
    });
    definitions.push(IndicatorDefinition {
        name: "Ratio of spammers to assigned",
        value: overall.assigned_spammers_to_assigned,
        unit: HealthIndicatorUnit::Ratio,
        brackets: ratio_brackets(&config.spammers_ratio, SPAMMERS_RECOMMENDATION),
    });

    definitions
        .into_iter()
        .map(|definition| definition.classify(config))
        .collect()
}

/// Health indicators of the experiment itself (run time)
pub fn experiment_health_indicators(
    experiment: &Experiment,
    now: DateTime<Utc>,
    config: &HealthConfig,
) -> Vec<HealthIndicator> {
    let definition = IndicatorDefinition {
        name: "Experiment run time",
        value: run_days(experiment, now),
        unit: HealthIndicatorUnit::Days,
        brackets: run_time_brackets(&config.run_time_days),
    };

    vec![definition.classify(config)]
}

/// Most severe indication among `indicators`, if any
pub fn worst_severity(indicators: &[HealthIndicator]) -> Option<Severity> {
    indicators
        .iter()
        .map(|indicator| indicator.indication.severity)
        .max()
}

// A ratio of 0 or NaN means no participant was ever exposed.
fn has_exposure_data(exposed_to_assigned: f64) -> bool {
    exposed_to_assigned != 0.0 && !exposed_to_assigned.is_nan()
}

fn docs_link(config: &HealthConfig, name: &str) -> Option<String> {
    let base = config.docs_base_url.as_deref()?;
    let anchor = name.to_lowercase().replace(' ', "-");
    Some(format!("{}#{}", base.trim_end_matches('/'), anchor))
}
