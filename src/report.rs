//! Complete health report of one experiment
//!
//! Bundles reconciled counts, derived statistics and every health indicator
//! so output formats render from a single value.

use crate::analysis::{AnalysesByStrategy, AnalysisStrategy};
use crate::experiment::{run_days, Experiment, VariationId};
use crate::health::{
    experiment_health_indicators, experiment_participant_health_indicators,
    experiment_participant_stats, participant_counts, worst_severity, ExperimentParticipantStats,
    HealthConfig, HealthIndicationSeverity, HealthIndicator, ParticipantCounts,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub experiment_id: u64,
    pub experiment_name: String,
    pub run_days: f64,
    pub variation_names: BTreeMap<VariationId, String>,
    pub participant_counts: ParticipantCounts,
    /// Strategies without an analysis; their counts are taken as 0
    pub missing_strategies: Vec<AnalysisStrategy>,
    pub participant_stats: ExperimentParticipantStats,
    /// Experiment indicators first, then participant indicators
    pub indicators: Vec<HealthIndicator>,
    pub worst_severity: Option<HealthIndicationSeverity>,
}

impl HealthReport {
    pub fn build(
        experiment: &Experiment,
        analyses: &AnalysesByStrategy,
        now: DateTime<Utc>,
        config: &HealthConfig,
    ) -> Self {
        if analyses.is_empty() {
            tracing::warn!(
                "No analyses for experiment {}, all participant counts are 0",
                experiment.experiment_id
            );
        }
        let missing_strategies = AnalysisStrategy::ALL
            .into_iter()
            .filter(|&strategy| analyses.get(strategy).is_none())
            .collect();

        let participant_stats = experiment_participant_stats(experiment, analyses);

        let mut indicators = experiment_health_indicators(experiment, now, config);
        indicators.extend(experiment_participant_health_indicators(
            &participant_stats,
            config,
        ));
        let worst_severity = worst_severity(&indicators);

        tracing::info!(
            "Experiment {} health: {} indicators, worst severity {:?}",
            experiment.experiment_id,
            indicators.len(),
            worst_severity
        );

        Self {
            experiment_id: experiment.experiment_id,
            experiment_name: experiment.name.clone(),
            run_days: run_days(experiment, now),
            variation_names: experiment
                .variations
                .iter()
                .map(|v| (v.variation_id, v.name.clone()))
                .collect(),
            participant_counts: participant_counts(experiment, analyses),
            missing_strategies,
            participant_stats,
            indicators,
            worst_severity,
        }
    }

    /// Whether any indicator is at or above `threshold`
    pub fn fails(&self, threshold: HealthIndicationSeverity) -> bool {
        self.worst_severity
            .is_some_and(|severity| severity >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analysis, AnalysisStrategy, ParticipantCountKey};
    use crate::experiment::{Status, Variation};
    use chrono::TimeZone;

    fn experiment() -> Experiment {
        Experiment {
            experiment_id: 5,
            name: "search_ranking".to_string(),
            status: Status::Completed,
            start_datetime: Some(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()),
            end_datetime: Some(Utc.with_ymd_and_hms(2026, 4, 15, 0, 0, 0).unwrap()),
            variations: vec![
                Variation {
                    variation_id: 1,
                    name: "control".to_string(),
                    allocated_percentage: 50.0,
                    is_default: true,
                },
                Variation {
                    variation_id: 2,
                    name: "ranker_v2".to_string(),
                    allocated_percentage: 50.0,
                    is_default: false,
                },
            ],
        }
    }

    fn analyses() -> AnalysesByStrategy {
        AnalysesByStrategy::from_analyses(AnalysisStrategy::ALL.into_iter().map(|strategy| {
            Analysis {
                analysis_strategy: strategy,
                participant_stats: BTreeMap::from([
                    (ParticipantCountKey::Total, 1_000),
                    (ParticipantCountKey::Variation(1), 500),
                    (ParticipantCountKey::Variation(2), 500),
                ]),
                analysis_datetime: None,
            }
        }))
    }

    #[test]
    fn test_build_report() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let report = HealthReport::build(&experiment(), &analyses(), now, &HealthConfig::default());

        assert_eq!(report.experiment_id, 5);
        assert_eq!(report.run_days, 14.0);
        assert_eq!(report.variation_names[&2], "ranker_v2");
        assert_eq!(report.participant_counts.total.assigned, 1_000);
        assert!(report.missing_strategies.is_empty());
        assert_eq!(report.indicators.len(), 6);
        assert_eq!(report.indicators[0].name, "Experiment run time");
        assert_eq!(report.indicators[1].name, "Assignment distribution");
        assert_eq!(report.worst_severity, Some(HealthIndicationSeverity::Ok));
        assert!(!report.fails(HealthIndicationSeverity::Warning));
    }

    #[test]
    fn test_fails_on_threshold() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let mut exp = experiment();
        exp.end_datetime = Some(Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap());
        let report = HealthReport::build(&exp, &analyses(), now, &HealthConfig::default());

        assert_eq!(report.worst_severity, Some(HealthIndicationSeverity::Warning));
        assert!(report.fails(HealthIndicationSeverity::Warning));
        assert!(!report.fails(HealthIndicationSeverity::Error));
    }

    #[test]
    fn test_missing_strategies_listed_in_lattice_order() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let mut analyses = AnalysesByStrategy::new();
        for analysis in [AnalysisStrategy::IttPure, AnalysisStrategy::MittNoSpammers]
            .into_iter()
            .filter_map(|strategy| self::analyses().get(strategy).cloned())
        {
            analyses.insert(analysis);
        }

        let report = HealthReport::build(&experiment(), &analyses, now, &HealthConfig::default());

        assert_eq!(
            report.missing_strategies,
            vec![
                AnalysisStrategy::MittNoCrossovers,
                AnalysisStrategy::MittNoSpammersNoCrossovers,
                AnalysisStrategy::PpNaive,
            ]
        );
    }
}
