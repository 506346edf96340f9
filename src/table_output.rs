//! Plain-text table output for health reports

use crate::health::{CountsSet, HealthIndicator, HealthIndicatorUnit};
use crate::report::HealthReport;
use std::fmt::Write;

/// Render a report as aligned text tables
pub fn render(report: &HealthReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Experiment {}: {} (run time {:.2} days)",
        report.experiment_id, report.experiment_name, report.run_days
    );
    out.push('\n');

    let counts = &report.participant_counts;
    let mut count_rows = vec![count_row("total".to_string(), &counts.total)];
    for (id, set) in &counts.by_variation_id {
        let label = match report.variation_names.get(id) {
            Some(name) => format!("{} ({})", name, id),
            None => id.to_string(),
        };
        count_rows.push(count_row(label, set));
    }
    out.push_str(&render_table(
        &[
            "Participants",
            "Assigned",
            "Exposed",
            "Crossovers",
            "Spammers",
            "No spammers/crossovers",
        ],
        &count_rows,
    ));
    if !report.missing_strategies.is_empty() {
        let missing: Vec<&str> = report
            .missing_strategies
            .iter()
            .map(|strategy| strategy.description())
            .collect();
        let _ = writeln!(out, "Missing analyses (counted as 0): {}", missing.join(", "));
    }
    out.push('\n');

    let indicator_rows: Vec<Vec<String>> = report.indicators.iter().map(indicator_row).collect();
    out.push_str(&render_table(
        &[
            "Name",
            "Unit",
            "Value",
            "Indication",
            "Reason",
            "Recommendation",
        ],
        &indicator_rows,
    ));

    if let Some(severity) = report.worst_severity {
        let _ = writeln!(out, "\nOverall: {}", severity);
    }

    out
}

fn count_row(label: String, set: &CountsSet) -> Vec<String> {
    vec![
        label,
        set.assigned.to_string(),
        set.exposed.to_string(),
        set.assigned_crossovers.to_string(),
        set.assigned_spammers.to_string(),
        set.assigned_no_spammers_no_crossovers.to_string(),
    ]
}

fn indicator_row(indicator: &HealthIndicator) -> Vec<String> {
    let indication = &indicator.indication;
    vec![
        indicator.name.clone(),
        indicator.unit.to_string(),
        format_value(indicator.value, indicator.unit),
        format!("{} ({})", indication.code, indication.severity),
        indication.reason.clone(),
        indication.recommendation.clone().unwrap_or_default(),
    ]
}

fn format_value(value: f64, unit: HealthIndicatorUnit) -> String {
    match unit {
        HealthIndicatorUnit::Pvalue if value != 0.0 && value.abs() < 1e-4 => format!("{:.2e}", value),
        HealthIndicatorUnit::Pvalue | HealthIndicatorUnit::Ratio => format!("{:.4}", value),
        HealthIndicatorUnit::Days => format!("{:.2}", value),
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separators: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();

    let mut out = format_line(headers.iter().copied(), &widths);
    out.push_str(&format_line(separators.iter().map(String::as_str), &widths));
    for row in rows {
        out.push_str(&format_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysesByStrategy;
    use crate::experiment::{Experiment, Status, Variation};
    use crate::health::HealthConfig;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_lists_missing_analyses() {
        let experiment = Experiment {
            experiment_id: 11,
            name: "signup_copy".to_string(),
            status: Status::Running,
            start_datetime: None,
            end_datetime: None,
            variations: vec![Variation {
                variation_id: 1,
                name: "control".to_string(),
                allocated_percentage: 100.0,
                is_default: true,
            }],
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = HealthReport::build(
            &experiment,
            &AnalysesByStrategy::new(),
            now,
            &HealthConfig::default(),
        );

        let rendered = render(&report);

        assert!(rendered.contains("control (1)"));
        assert!(rendered.contains(
            "Missing analyses (counted as 0): All participants, Without crossovers, \
             Without spammers, Without crossovers and spammers, \
             Exposed without crossovers and spammers"
        ));
        assert!(rendered.ends_with("Overall: error\n"));
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(
            &["Name", "Value"],
            &[
                vec!["a".to_string(), "1".to_string()],
                vec!["longer".to_string(), "22".to_string()],
            ],
        );
        assert_eq!(
            table,
            "Name    Value\n------  -----\na       1\nlonger  22\n"
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.5, HealthIndicatorUnit::Pvalue), "0.5000");
        assert_eq!(format_value(0.00001234, HealthIndicatorUnit::Pvalue), "1.23e-5");
        assert_eq!(format_value(f64::NAN, HealthIndicatorUnit::Ratio), "NaN");
        assert_eq!(format_value(14.0, HealthIndicatorUnit::Days), "14.00");
    }
}
