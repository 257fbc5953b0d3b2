//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the forecasting code stays clean and testable
//! - output changes are localized

use crate::domain::{BackendKind, ForecastResult};
use crate::error::ForecastError;
use crate::io::ingest::NormalizedData;
use crate::report::{PeriodComparison, RegionSummary};

/// Maximum number of row issues listed individually.
const MAX_LISTED_ISSUES: usize = 10;

/// Header block describing the loaded data.
pub fn format_data_summary(data: &NormalizedData) -> String {
    let mut out = String::new();
    out.push_str("=== ur - Unemployment Rate Forecast ===\n");
    out.push_str(&format!("Rows: {}\n", data.rows_read));
    match (data.series.first_date(), data.series.last_date()) {
        (Some(first), Some(last)) => out.push_str(&format!("Dates: {first} .. {last}\n")),
        _ => out.push_str("Dates: none parsed\n"),
    }
    if !data.row_issues.is_empty() {
        out.push_str(&format!(
            "Row issues: {} (unparseable dates: {})\n",
            data.row_issues.len(),
            data.unparseable_dates()
        ));
        for issue in data.row_issues.iter().take(MAX_LISTED_ISSUES) {
            out.push_str(&format!("  - {issue}\n"));
        }
        if data.row_issues.len() > MAX_LISTED_ISSUES {
            out.push_str(&format!("  ... and {} more\n", data.row_issues.len() - MAX_LISTED_ISSUES));
        }
    }
    out
}

/// Forecast table.
pub fn format_forecast(result: &ForecastResult, scope: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nNext {}-month forecast ({}) - {}:\n",
        result.horizon(),
        result.backend.display_name(),
        scope.unwrap_or("all regions"),
    ));
    out.push_str(&format!("{:<12} {:>10}\n", "date", "forecast"));
    for p in &result.points {
        out.push_str(&format!("{:<12} {:>10.3}\n", p.date.to_string(), p.value));
    }
    out
}

/// One line per backend outcome for `ur compare`.
pub fn format_comparison(outcomes: &[(BackendKind, Result<ForecastResult, ForecastError>)]) -> String {
    let mut out = String::new();
    for (kind, outcome) in outcomes {
        match outcome {
            Ok(result) => out.push_str(&format_forecast(result, None)),
            Err(err) => out.push_str(&format!("\n{} unavailable: {err}\n", kind.display_name())),
        }
    }
    out
}

/// Overview block: period comparison + monthly profile.
pub fn format_overview(comparison: &PeriodComparison, profile: &[(u32, f64)]) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nMean rate around {}:\n", comparison.cutoff));
    out.push_str(&format!(
        "- before: {} (n={})\n",
        fmt_pct(comparison.before),
        comparison.n_before
    ));
    out.push_str(&format!(
        "- after : {} (n={})\n",
        fmt_pct(comparison.after),
        comparison.n_after
    ));
    if let Some(delta) = comparison.delta() {
        out.push_str(&format!("- delta : {delta:+.2}\n"));
    }

    out.push_str("\nMonthly average:\n");
    for (month, value) in profile {
        out.push_str(&format!("{month:>2}  {value:>8.2}%\n"));
    }
    out
}

/// Distribution summary for one region.
pub fn format_region_summary(summary: &RegionSummary) -> String {
    format!(
        "\nRegion: {}\nRows: {} (with rate: {})\nmin={:.2} q1={:.2} median={:.2} q3={:.2} max={:.2} mean={:.2}\n",
        summary.region,
        summary.rows,
        summary.n_rates,
        summary.min,
        summary.q1,
        summary.median,
        summary.q3,
        summary.max,
        summary.mean
    )
}

/// `(region, rate)` snapshot as a two-column table.
pub fn format_snapshot(date: chrono::NaiveDate, rows: &[(String, f64)]) -> String {
    let mut out = format!("\nRate by region on {date}:\n");
    for (region, rate) in rows {
        out.push_str(&format!("{region:<24} {rate:>8.2}%\n"));
    }
    out
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::ForecastPoint;

    #[test]
    fn forecast_table_lists_every_point() {
        let result = ForecastResult {
            backend: BackendKind::Decomposition,
            points: (1..=3)
                .map(|m| ForecastPoint {
                    date: NaiveDate::from_ymd_opt(2021, m, 1).unwrap(),
                    value: -0.5 * m as f64,
                })
                .collect(),
        };
        let text = format_forecast(&result, Some("Assam"));
        assert!(text.contains("Next 3-month forecast"));
        assert!(text.contains("Assam"));
        assert!(text.contains("2021-03-01"));
        assert!(text.contains("-1.500"));
    }

    #[test]
    fn comparison_reports_failures_inline() {
        let outcomes = vec![(
            BackendKind::TrendRegression,
            Err(ForecastError::ModelUnavailable {
                location: "models/rf_model.json".into(),
                reason: "artifact not found".into(),
            }),
        )];
        let text = format_comparison(&outcomes);
        assert!(text.contains("Trend regression (tree ensemble) unavailable"));
        assert!(text.contains("artifact not found"));
    }

    #[test]
    fn missing_period_mean_prints_dash() {
        let cmp = PeriodComparison {
            cutoff: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            before: None,
            after: Some(10.0),
            n_before: 0,
            n_after: 2,
        };
        let text = format_overview(&cmp, &[]);
        assert!(text.contains("before: - (n=0)"));
        assert!(!text.contains("delta"));
    }
}
