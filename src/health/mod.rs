// Experiment health analysis
//
// Pure, leaves-first pipeline:
//
//   per-strategy analyses
//     -> reconciled participant counts   (reconciliation)
//     -> ratios and allocation p-values  (participant_stats, binomial)
//     -> bracket classification          (brackets)
//     -> ordered indicator list          (indicators)
//
// Nothing here performs I/O or holds state. Data-quality problems degrade to
// NaN values and ValueError indications instead of errors, since experiment
// data is routinely partial (missing strategies, zero participants, early runs).

mod binomial;
mod brackets;
mod config;
mod indicators;
mod participant_stats;
mod reconciliation;

pub use binomial::{binomial_prob_value, BinomialTrials};
pub use brackets::{
    indication_from_brackets, BracketIndication, HealthIndication, HealthIndicationCode,
    HealthIndicationSeverity, IndicationBracket, CONTACT_US_RECOMMENDATION,
};
pub use config::{HealthConfig, PvalueThresholds, RatioThresholds, RunTimeThresholds};
pub use indicators::{
    experiment_health_indicators, experiment_participant_health_indicators, worst_severity,
    HealthIndicator, HealthIndicatorUnit,
};
pub use participant_stats::{
    experiment_participant_stats, AssignedRatios, ExperimentParticipantStats,
    ParticipantProbabilities, ParticipantRatios, VariationProbabilities, VariationRatios,
};
pub use reconciliation::{
    participant_counts, participant_counts_set_for_key, CountsSet, ParticipantCounts,
};
