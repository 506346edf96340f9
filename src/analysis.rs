//! Per-strategy analyses as supplied by the analysis API
//!
//! Each analysis strategy counts participants under a different inclusion
//! rule. The health engine only needs the participant counts of each
//! strategy, keyed by [`ParticipantCountKey`].

use crate::error::HealthError;
use crate::experiment::VariationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Participant-inclusion rule of an analysis
///
/// The strategies form a containment lattice:
/// `IttPure ⊇ {MittNoCrossovers, MittNoSpammers} ⊇ MittNoSpammersNoCrossovers`,
/// with `PpNaive` the exposure-filtered analogue of `MittNoSpammersNoCrossovers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStrategy {
    IttPure,
    MittNoCrossovers,
    MittNoSpammers,
    MittNoSpammersNoCrossovers,
    PpNaive,
}

impl AnalysisStrategy {
    /// All strategies, loosest first
    pub const ALL: [AnalysisStrategy; 5] = [
        AnalysisStrategy::IttPure,
        AnalysisStrategy::MittNoCrossovers,
        AnalysisStrategy::MittNoSpammers,
        AnalysisStrategy::MittNoSpammersNoCrossovers,
        AnalysisStrategy::PpNaive,
    ];

    /// Human-readable description of who the strategy counts
    pub fn description(self) -> &'static str {
        match self {
            AnalysisStrategy::IttPure => "All participants",
            AnalysisStrategy::MittNoCrossovers => "Without crossovers",
            AnalysisStrategy::MittNoSpammers => "Without spammers",
            AnalysisStrategy::MittNoSpammersNoCrossovers => "Without crossovers and spammers",
            AnalysisStrategy::PpNaive => "Exposed without crossovers and spammers",
        }
    }
}

/// Key into [`ParticipantStats`]: the whole population or one variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParticipantCountKey {
    Total,
    Variation(VariationId),
}

const VARIATION_KEY_PREFIX: &str = "variation_";

impl fmt::Display for ParticipantCountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantCountKey::Total => write!(f, "total"),
            ParticipantCountKey::Variation(id) => write!(f, "{}{}", VARIATION_KEY_PREFIX, id),
        }
    }
}

impl FromStr for ParticipantCountKey {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "total" {
            return Ok(ParticipantCountKey::Total);
        }

        s.strip_prefix(VARIATION_KEY_PREFIX)
            .and_then(|id| id.parse::<VariationId>().ok())
            .map(ParticipantCountKey::Variation)
            .ok_or_else(|| HealthError::InvalidParticipantKey(s.to_string()))
    }
}

impl TryFrom<String> for ParticipantCountKey {
    type Error = HealthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParticipantCountKey> for String {
    fn from(key: ParticipantCountKey) -> Self {
        key.to_string()
    }
}

/// Participant counts of one analysis, keyed by population
pub type ParticipantStats = BTreeMap<ParticipantCountKey, u64>;

/// Result of one analysis strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis_strategy: AnalysisStrategy,
    #[serde(default)]
    pub participant_stats: ParticipantStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_datetime: Option<DateTime<Utc>>,
}

impl Analysis {
    /// Participant count for `key`, 0 when the key is absent
    pub fn count(&self, key: ParticipantCountKey) -> u64 {
        self.participant_stats.get(&key).copied().unwrap_or(0)
    }
}

/// Analyses indexed by strategy; any strategy may be missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysesByStrategy {
    analyses: BTreeMap<AnalysisStrategy, Analysis>,
}

impl AnalysesByStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a list of analyses by strategy
    ///
    /// When a strategy appears more than once, the analysis with the latest
    /// `analysis_datetime` wins. An analysis with a datetime beats one
    /// without; on ties the later entry in the list wins.
    pub fn from_analyses<I>(analyses: I) -> Self
    where
        I: IntoIterator<Item = Analysis>,
    {
        let mut by_strategy = Self::new();
        for analysis in analyses {
            let strategy = analysis.analysis_strategy;
            match by_strategy.analyses.get(&strategy) {
                Some(existing) if existing.analysis_datetime > analysis.analysis_datetime => {
                    tracing::warn!(
                        "Duplicate {:?} analysis, keeping the one from {:?}",
                        strategy,
                        existing.analysis_datetime
                    );
                }
                Some(_) => {
                    tracing::warn!(
                        "Duplicate {:?} analysis, keeping the one from {:?}",
                        strategy,
                        analysis.analysis_datetime
                    );
                    by_strategy.insert(analysis);
                }
                None => by_strategy.insert(analysis),
            }
        }
        by_strategy
    }

    /// Insert an analysis, replacing any previous one for the same strategy
    pub fn insert(&mut self, analysis: Analysis) {
        self.analyses.insert(analysis.analysis_strategy, analysis);
    }

    pub fn get(&self, strategy: AnalysisStrategy) -> Option<&Analysis> {
        self.analyses.get(&strategy)
    }

    /// Participant count under `strategy` for `key`
    ///
    /// Missing analyses and missing keys both count as 0.
    pub fn count(&self, strategy: AnalysisStrategy, key: ParticipantCountKey) -> u64 {
        self.get(strategy).map_or(0, |analysis| analysis.count(key))
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}
