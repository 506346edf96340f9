// Participant reconciliation across the five analysis strategies
//
// Crossovers and spammers are never measured directly. They are the
// participants present under IttPure but removed once the corresponding
// filter is applied, so they are derived by subtraction.

use crate::analysis::{AnalysesByStrategy, AnalysisStrategy, ParticipantCountKey};
use crate::experiment::{Experiment, VariationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reconciled participant counts for one population
///
/// Counts are signed: inconsistent upstream strategies (a stricter filter
/// reporting more participants than a looser one) produce negative
/// crossover/spammer counts, which are surfaced as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsSet {
    pub assigned: i64,
    pub assigned_crossovers: i64,
    pub assigned_spammers: i64,
    pub assigned_no_spammers_no_crossovers: i64,
    pub exposed: i64,
}

/// Reconciled counts for the whole population and each variation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantCounts {
    pub total: CountsSet,
    pub by_variation_id: BTreeMap<VariationId, CountsSet>,
}

/// Reconcile the counts of one population across all strategies
///
/// Missing analyses and missing keys count as 0.
pub fn participant_counts_set_for_key(
    key: ParticipantCountKey,
    analyses: &AnalysesByStrategy,
) -> CountsSet {
    let count = |strategy| analyses.count(strategy, key) as i64;

    let assigned = count(AnalysisStrategy::IttPure);
    let counts = CountsSet {
        assigned,
        assigned_crossovers: assigned - count(AnalysisStrategy::MittNoCrossovers),
        assigned_spammers: assigned - count(AnalysisStrategy::MittNoSpammers),
        assigned_no_spammers_no_crossovers: count(AnalysisStrategy::MittNoSpammersNoCrossovers),
        exposed: count(AnalysisStrategy::PpNaive),
    };

    if counts.assigned_crossovers < 0 || counts.assigned_spammers < 0 {
        tracing::warn!(
            "Inconsistent strategy counts for {}: crossovers={}, spammers={}",
            key,
            counts.assigned_crossovers,
            counts.assigned_spammers
        );
    }

    counts
}

/// Reconcile counts for the total population and every variation
pub fn participant_counts(
    experiment: &Experiment,
    analyses: &AnalysesByStrategy,
) -> ParticipantCounts {
    let by_variation_id = experiment
        .variations
        .iter()
        .map(|variation| {
            let key = ParticipantCountKey::Variation(variation.variation_id);
            (
                variation.variation_id,
                participant_counts_set_for_key(key, analyses),
            )
        })
        .collect();

    ParticipantCounts {
        total: participant_counts_set_for_key(ParticipantCountKey::Total, analyses),
        by_variation_id,
    }
}
