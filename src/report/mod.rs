//! Descriptive aggregates over a normalized series.
//!
//! Every date-bounded aggregate works on dated observations only; undated rows
//! are counted in `rows` totals but never fall inside a date range.

pub mod format;

pub use format::*;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::Series;

/// Mean rate before and after a cutoff date.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodComparison {
    pub cutoff: NaiveDate,
    pub before: Option<f64>,
    pub after: Option<f64>,
    pub n_before: usize,
    pub n_after: usize,
}

impl PeriodComparison {
    /// `after - before` when both sides have data.
    pub fn delta(&self) -> Option<f64> {
        Some(self.after? - self.before?)
    }
}

/// Distribution summary of one region's rates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub region: String,
    pub rows: usize,
    pub n_rates: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

/// Mean rate before `cutoff` (exclusive) and from `cutoff` on.
pub fn compare_periods(series: &Series, cutoff: NaiveDate) -> PeriodComparison {
    let before = series.rates_between(None, Some(cutoff));
    let after = series.rates_between(Some(cutoff), None);
    PeriodComparison {
        cutoff,
        before: mean(&before),
        after: mean(&after),
        n_before: before.len(),
        n_after: after.len(),
    }
}

/// Mean rate per calendar month (1–12), months without data omitted.
pub fn monthly_profile(series: &Series) -> Vec<(u32, f64)> {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for obs in series.iter() {
        if let (Some(month), Some(rate)) = (obs.month(), obs.rate) {
            groups.entry(month).or_default().push(rate);
        }
    }
    groups
        .into_iter()
        .filter_map(|(m, rates)| mean(&rates).map(|v| (m, v)))
        .collect()
}

/// Sorted unique region labels.
pub fn regions(series: &Series) -> Vec<String> {
    series
        .iter()
        .map(|o| o.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted unique parsed dates.
pub fn available_dates(series: &Series) -> Vec<NaiveDate> {
    series.dated().map(|(d, _)| d).collect::<BTreeSet<_>>().into_iter().collect()
}

/// `(region, rate)` for every observation on `date`, sorted by region.
pub fn snapshot_on(series: &Series, date: NaiveDate) -> Vec<(String, f64)> {
    let mut out: Vec<(String, f64)> = series
        .dated()
        .filter(|(d, _)| *d == date)
        .filter_map(|(_, o)| o.rate.map(|r| (o.region.clone(), r)))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

/// Box-plot style summary for one region; `None` when it has no rates.
pub fn summarize_region(series: &Series, region: &str) -> Option<RegionSummary> {
    let filtered = series.filter_region(region);
    let mut rates: Vec<f64> = filtered.iter().filter_map(|o| o.rate).collect();
    if rates.is_empty() {
        return None;
    }
    rates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Some(RegionSummary {
        region: region.to_string(),
        rows: filtered.len(),
        n_rates: rates.len(),
        min: rates[0],
        q1: quantile(&rates, 0.25),
        median: quantile(&rates, 0.5),
        q3: quantile(&rates, 0.75),
        max: rates[rates.len() - 1],
        mean: mean(&rates).unwrap_or(f64::NAN),
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Linear-interpolated quantile of sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, ObservationDate};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Series {
        let rows = vec![
            (Some(ymd(2020, 1, 31)), "Assam", 4.0),
            (Some(ymd(2020, 1, 31)), "Bihar", 10.0),
            (Some(ymd(2020, 2, 29)), "Assam", 5.0),
            (Some(ymd(2020, 4, 30)), "Assam", 11.0),
            (Some(ymd(2020, 4, 30)), "Bihar", 46.0),
            (None, "Bihar", 99.0),
        ];
        let obs = rows
            .into_iter()
            .enumerate()
            .map(|(i, (d, region, rate))| {
                let date = match d {
                    Some(d) => ObservationDate::Parsed(d),
                    None => ObservationDate::Unparseable(String::new()),
                };
                Observation::new(i + 2, date, region, Some(rate))
            })
            .collect();
        Series::from_observations(obs)
    }

    #[test]
    fn period_comparison_excludes_undated_rows() {
        let cmp = compare_periods(&sample(), ymd(2020, 3, 1));
        assert_eq!(cmp.n_before, 3);
        assert_eq!(cmp.n_after, 2);
        assert!((cmp.before.unwrap() - 19.0 / 3.0).abs() < 1e-12);
        assert!((cmp.after.unwrap() - 28.5).abs() < 1e-12);
        assert!(cmp.delta().unwrap() > 0.0);
    }

    #[test]
    fn monthly_profile_groups_by_calendar_month() {
        let profile = monthly_profile(&sample());
        assert_eq!(profile, vec![(1, 7.0), (2, 5.0), (4, 28.5)]);
    }

    #[test]
    fn regions_are_sorted_and_unique() {
        assert_eq!(regions(&sample()), vec!["Assam".to_string(), "Bihar".to_string()]);
    }

    #[test]
    fn snapshot_lists_rates_for_one_date() {
        let snap = snapshot_on(&sample(), ymd(2020, 4, 30));
        assert_eq!(snap, vec![("Assam".to_string(), 11.0), ("Bihar".to_string(), 46.0)]);
        assert_eq!(available_dates(&sample()).len(), 3);
    }

    #[test]
    fn region_summary_counts_undated_rows() {
        let s = summarize_region(&sample(), "Bihar").unwrap();
        assert_eq!(s.rows, 3);
        assert_eq!(s.n_rates, 3);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.median, 46.0);
        assert_eq!(s.max, 99.0);
        assert!((s.q1 - 28.0).abs() < 1e-12);

        assert!(summarize_region(&sample(), "Goa").is_none());
    }
}
