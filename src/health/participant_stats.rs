// Ratios and allocation p-values derived from reconciled participant counts
//
// Divisions follow IEEE-754: a zero denominator yields NaN (or ±∞), which the
// bracket classifier later reports as a value error.

use crate::analysis::AnalysesByStrategy;
use crate::experiment::{Experiment, VariationId};
use crate::health::binomial::{binomial_prob_value, BinomialTrials};
use crate::health::reconciliation::{participant_counts, CountsSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ratios of sub-populations to the assigned population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssignedRatios {
    pub exposed_to_assigned: f64,
    pub assigned_spammers_to_assigned: f64,
    pub assigned_crossovers_to_assigned: f64,
    pub assigned_no_spammers_no_crossovers_to_assigned: f64,
}

impl AssignedRatios {
    fn from_counts(counts: &CountsSet) -> Self {
        Self {
            exposed_to_assigned: ratio(counts.exposed, counts.assigned),
            assigned_spammers_to_assigned: ratio(counts.assigned_spammers, counts.assigned),
            assigned_crossovers_to_assigned: ratio(counts.assigned_crossovers, counts.assigned),
            assigned_no_spammers_no_crossovers_to_assigned: ratio(
                counts.assigned_no_spammers_no_crossovers,
                counts.assigned,
            ),
        }
    }
}

/// Ratios for one variation: against its own assigned participants and as a
/// share of the experiment totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariationRatios {
    #[serde(flatten)]
    pub assigned: AssignedRatios,
    pub exposed_to_total_exposed: f64,
    pub assigned_to_total_assigned: f64,
    pub assigned_spammers_to_total_assigned_spammers: f64,
    pub assigned_crossovers_to_total_assigned_crossovers: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRatios {
    pub overall: AssignedRatios,
    pub by_variation_id: BTreeMap<VariationId, VariationRatios>,
}

/// Two-sided p-values of a variation's share against its allocated share
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariationProbabilities {
    pub exposed: f64,
    pub assigned: f64,
    pub assigned_no_spammers_no_crossovers: f64,
}

impl VariationProbabilities {
    /// Elementwise minimum, NaN-propagating
    pub fn min(self, other: Self) -> Self {
        Self {
            exposed: nan_min(self.exposed, other.exposed),
            assigned: nan_min(self.assigned, other.assigned),
            assigned_no_spammers_no_crossovers: nan_min(
                self.assigned_no_spammers_no_crossovers,
                other.assigned_no_spammers_no_crossovers,
            ),
        }
    }

    /// Identity of [`VariationProbabilities::min`]
    pub fn infinity() -> Self {
        Self {
            exposed: f64::INFINITY,
            assigned: f64::INFINITY,
            assigned_no_spammers_no_crossovers: f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantProbabilities {
    pub by_variation_id: BTreeMap<VariationId, VariationProbabilities>,
}

/// Derived participant statistics of an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParticipantStats {
    pub ratios: ParticipantRatios,
    pub probabilities: ParticipantProbabilities,
}

/// Compute participant ratios and allocation p-values for an experiment
pub fn experiment_participant_stats(
    experiment: &Experiment,
    analyses: &AnalysesByStrategy,
) -> ExperimentParticipantStats {
    let counts = participant_counts(experiment, analyses);
    let total = &counts.total;

    let mut ratios_by_variation = BTreeMap::new();
    let mut probabilities_by_variation = BTreeMap::new();

    for variation in &experiment.variations {
        let Some(variation_counts) = counts.by_variation_id.get(&variation.variation_id) else {
            continue;
        };

        ratios_by_variation.insert(
            variation.variation_id,
            VariationRatios {
                assigned: AssignedRatios::from_counts(variation_counts),
                exposed_to_total_exposed: ratio(variation_counts.exposed, total.exposed),
                assigned_to_total_assigned: ratio(variation_counts.assigned, total.assigned),
                assigned_spammers_to_total_assigned_spammers: ratio(
                    variation_counts.assigned_spammers,
                    total.assigned_spammers,
                ),
                assigned_crossovers_to_total_assigned_crossovers: ratio(
                    variation_counts.assigned_crossovers,
                    total.assigned_crossovers,
                ),
            },
        );

        let allocated_share = experiment.allocated_share(variation);
        let allocation_test = |observed: i64, population: i64| {
            binomial_prob_value(BinomialTrials {
                successful_trials: observed,
                total_trials: population,
                probability_of_success: allocated_share,
            })
        };

        probabilities_by_variation.insert(
            variation.variation_id,
            VariationProbabilities {
                exposed: allocation_test(variation_counts.exposed, total.exposed),
                assigned: allocation_test(variation_counts.assigned, total.assigned),
                assigned_no_spammers_no_crossovers: allocation_test(
                    variation_counts.assigned_no_spammers_no_crossovers,
                    total.assigned_no_spammers_no_crossovers,
                ),
            },
        );
    }

    tracing::debug!(
        "Derived participant stats for experiment {} ({} variations)",
        experiment.experiment_id,
        probabilities_by_variation.len()
    );

    ExperimentParticipantStats {
        ratios: ParticipantRatios {
            overall: AssignedRatios::from_counts(total),
            by_variation_id: ratios_by_variation,
        },
        probabilities: ParticipantProbabilities {
            by_variation_id: probabilities_by_variation,
        },
    }
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    numerator as f64 / denominator as f64
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}
