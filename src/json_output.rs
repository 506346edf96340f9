//! JSON output format for health reports
//!
//! NaN and infinite values (zero-denominator ratios, empty minimums) have no
//! JSON representation and are written as `null`.

use crate::report::HealthReport;

/// Serialize a report as pretty-printed JSON
pub fn to_json(report: &HealthReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
