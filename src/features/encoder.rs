//! Feature encoding for the trend-regression backend.
//!
//! The artifact was trained on two features:
//!
//! - `Time`: zero-based ordinal position of the observation in the date-sorted series
//! - `Month`: calendar month (history) or a positional wrap (future)
//!
//! Future rows continue the ordinal count contiguously from `len(series)`. Their
//! month is `(time_index mod 12) + 1`, which only matches the calendar when the
//! history starts in January and has no gaps. This is kept as-is.

use serde::Serialize;

use crate::domain::{FeatureRow, Series};

/// One historical observation in training-frame form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoricalRow {
    #[serde(rename = "Month")]
    pub month: Option<u32>,
    #[serde(rename = "Time")]
    pub time_index: usize,
    #[serde(rename = "Unemployment Rate")]
    pub rate: Option<f64>,
}

/// Assign the ordinal time index to every historical observation.
///
/// `Series` is already sorted by date (undated rows last), so the index is simply
/// the position.
pub fn encode_history(series: &Series) -> Vec<HistoricalRow> {
    series
        .iter()
        .enumerate()
        .map(|(time_index, obs)| HistoricalRow {
            month: obs.month(),
            time_index,
            rate: obs.rate,
        })
        .collect()
}

/// Feature rows for the `horizon` periods after the history.
pub fn encode_future(series: &Series, horizon: usize) -> Vec<FeatureRow> {
    let n = series.len();
    (n..n + horizon)
        .map(|time_index| FeatureRow {
            month: positional_month(time_index),
            time_index,
        })
        .collect()
}

fn positional_month(time_index: usize) -> u32 {
    (time_index % 12) as u32 + 1
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Observation, ObservationDate};

    fn monthly_series(n: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2018, 1, 31).unwrap();
        let obs = crate::features::calendar::future_month_dates(start, n.saturating_sub(1))
            .into_iter()
            .chain(std::iter::once(start))
            .enumerate()
            .map(|(i, d)| Observation::new(i + 2, ObservationDate::Parsed(d), "All", Some(i as f64)))
            .collect();
        Series::from_observations(obs)
    }

    #[test]
    fn history_indices_follow_date_order() {
        let series = monthly_series(6);
        let rows = encode_history(&series);
        assert_eq!(rows.len(), 6);
        for (w, obs) in rows.windows(2).zip(series.dated().collect::<Vec<_>>().windows(2)) {
            assert!(w[0].time_index < w[1].time_index);
            assert!(obs[0].0 <= obs[1].0);
        }
        assert_eq!(rows[0].month, Some(1));
        assert_eq!(rows[0].time_index, 0);
    }

    #[test]
    fn future_indices_are_contiguous() {
        let series = monthly_series(30);
        let rows = encode_future(&series, 12);
        let indices: Vec<usize> = rows.iter().map(|r| r.time_index).collect();
        assert_eq!(indices, (30..42).collect::<Vec<_>>());
    }

    #[test]
    fn future_months_wrap_positionally() {
        let series = monthly_series(10);
        let months: Vec<u32> = encode_future(&series, 12).iter().map(|r| r.month).collect();
        assert_eq!(months, vec![11, 12, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn undated_rows_still_advance_the_count() {
        let mut obs: Vec<Observation> = monthly_series(3).observations().to_vec();
        obs.push(Observation::new(99, ObservationDate::Unparseable(String::new()), "All", Some(1.0)));
        let series = Series::from_observations(obs);

        let history = encode_history(&series);
        assert_eq!(history.last().unwrap().month, None);
        assert_eq!(history.last().unwrap().time_index, 3);
        assert_eq!(encode_future(&series, 1)[0].time_index, 4);
    }

    #[test]
    fn encoding_is_deterministic() {
        let series = monthly_series(12);
        assert_eq!(encode_future(&series, 12), encode_future(&series, 12));
    }
}
