// Bracket classification of scalar health values
//
// A bracket list partitions the real line into intervals (prev_max, max],
// scanned left to right with the first match winning. Lists are expected to
// be sorted ascending by `max` and to end in the largest value the metric
// can legitimately take (`+∞` when unbounded).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommendation attached to values that cannot be classified
pub const CONTACT_US_RECOMMENDATION: &str =
    "Contact the experiment review team: the health data for this experiment looks malformed.";

/// Stable code of a health indication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthIndicationCode {
    Nominal,
    PossibleIssue,
    ProbableIssue,
    VeryLow,
    Low,
    High,
    VeryHigh,
    ValueError,
}

impl fmt::Display for HealthIndicationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthIndicationCode::Nominal => "nominal",
            HealthIndicationCode::PossibleIssue => "possible issue",
            HealthIndicationCode::ProbableIssue => "probable issue",
            HealthIndicationCode::VeryLow => "very low",
            HealthIndicationCode::Low => "low",
            HealthIndicationCode::High => "high",
            HealthIndicationCode::VeryHigh => "very high",
            HealthIndicationCode::ValueError => "value error",
        };
        f.write_str(label)
    }
}

/// Severity of a health indication, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthIndicationSeverity {
    Ok,
    Warning,
    Error,
}

impl fmt::Display for HealthIndicationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthIndicationSeverity::Ok => "ok",
            HealthIndicationSeverity::Warning => "warning",
            HealthIndicationSeverity::Error => "error",
        };
        f.write_str(label)
    }
}

/// Classification outcome of a bracket, before the matched interval is known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketIndication {
    pub code: HealthIndicationCode,
    pub severity: HealthIndicationSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl BracketIndication {
    pub fn new(code: HealthIndicationCode, severity: HealthIndicationSeverity) -> Self {
        Self {
            code,
            severity,
            recommendation: None,
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Upper-inclusive interval bound and the indication for values inside it
#[derive(Debug, Clone, PartialEq)]
pub struct IndicationBracket {
    pub max: f64,
    pub indication: BracketIndication,
}

impl IndicationBracket {
    pub fn new(max: f64, indication: BracketIndication) -> Self {
        Self { max, indication }
    }
}

/// Classified health value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthIndication {
    pub code: HealthIndicationCode,
    /// Human-readable description of the matched interval
    pub reason: String,
    pub severity: HealthIndicationSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl HealthIndication {
    /// Indication for a value that matches no bracket (NaN or out of range)
    pub fn value_error() -> Self {
        Self {
            code: HealthIndicationCode::ValueError,
            reason: "Unexpected value".to_string(),
            severity: HealthIndicationSeverity::Error,
            recommendation: Some(CONTACT_US_RECOMMENDATION.to_string()),
        }
    }
}

/// Classify `value` against brackets sorted ascending by `max`
///
/// The first bracket with `value <= max` wins, so a value equal to a bound
/// belongs to the lower bracket. NaN, and values above the last bound, yield
/// [`HealthIndication::value_error`] rather than failing. To be exhaustive
/// over a domain, the last bracket must end at the domain's upper limit:
/// `1.0` for p-values and ratios, `f64::INFINITY` for unbounded values.
///
/// # Example
/// ```
/// use experiment_health::health::{
///     indication_from_brackets, BracketIndication, HealthIndicationCode as Code,
///     HealthIndicationSeverity as Severity, IndicationBracket,
/// };
///
/// let brackets = vec![
///     IndicationBracket::new(0.001, BracketIndication::new(Code::ProbableIssue, Severity::Error)),
///     IndicationBracket::new(0.05, BracketIndication::new(Code::PossibleIssue, Severity::Warning)),
///     IndicationBracket::new(1.0, BracketIndication::new(Code::Nominal, Severity::Ok)),
/// ];
///
/// let indication = indication_from_brackets(&brackets, 0.03);
/// assert_eq!(indication.code, Code::PossibleIssue);
/// assert_eq!(indication.reason, "0.001 < x ≤ 0.05");
/// ```
pub fn indication_from_brackets(
    sorted_brackets_asc_by_max: &[IndicationBracket],
    value: f64,
) -> HealthIndication {
    let Some(index) = sorted_brackets_asc_by_max
        .iter()
        .position(|bracket| value <= bracket.max)
    else {
        tracing::debug!("Value {} matches no bracket", value);
        return HealthIndication::value_error();
    };

    let bracket = &sorted_brackets_asc_by_max[index];
    let lower = index
        .checked_sub(1)
        .map_or_else(|| "-∞".to_string(), |i| format_bound(sorted_brackets_asc_by_max[i].max));
    let reason = format!("{} < x ≤ {}", lower, format_bound(bracket.max));

    HealthIndication {
        code: bracket.indication.code,
        reason,
        severity: bracket.indication.severity,
        recommendation: bracket.indication.recommendation.clone(),
    }
}

fn format_bound(bound: f64) -> String {
    if bound == f64::INFINITY {
        "∞".to_string()
    } else if bound == f64::NEG_INFINITY {
        "-∞".to_string()
    } else {
        bound.to_string()
    }
}
