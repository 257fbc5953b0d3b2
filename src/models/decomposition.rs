//! Additive decomposition backend.
//!
//! Fits `y(t) = trend(t) + yearly(t)` on the history at request time:
//!
//! - `t` is scaled to `[0, 1]` over the history span and `y` is divided by `max |y|`
//! - the trend is piecewise linear with changepoints spread over the first part of
//!   the history
//! - the yearly component is a Fourier series, enabled only once the history covers
//!   enough days to identify it
//!
//! Coefficients come from one penalized least squares solve (Gaussian priors on the
//! changepoint deltas and seasonal terms), so repeated fits on the same series give
//! the same forecast.

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::domain::{BackendKind, DecompositionConfig, Series};
use crate::error::ForecastError;
use crate::features::future_month_dates;
use crate::forecast::RawForecast;
use crate::math::{YEAR_DAYS, hinge, piecewise_trend, push_fourier_terms, solve_penalized_least_squares};
use crate::models::traits::Forecaster;

/// Minimum number of distinct dates required to fit.
const MIN_DISTINCT_DATES: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct DecompositionBackend {
    config: DecompositionConfig,
}

impl DecompositionBackend {
    pub fn new(config: DecompositionConfig) -> Self {
        Self { config }
    }
}

impl Forecaster for DecompositionBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Decomposition
    }

    fn forecast_raw(&self, series: &Series, horizon: usize) -> Result<RawForecast, ForecastError> {
        let history = project(series);
        let model = fit(&history, &self.config)?;
        // Dated rows without a rate still extend the history the forecast follows.
        let history_end = series.last_date().ok_or(ForecastError::EmptyHistory)?;
        Ok(RawForecast::Decomposition(model.frame(&history, history_end, horizon)))
    }
}

/// One row of the fitted frame (history rows first, then future rows).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    pub ds: NaiveDate,
    pub trend: f64,
    pub yearly: f64,
    pub yhat: f64,
}

/// Decomposition output over history + future.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionFrame {
    pub history_end: NaiveDate,
    pub rows: Vec<FrameRow>,
}

/// `(ds, y)` projection: dated observations that carry a rate.
fn project(series: &Series) -> Vec<(NaiveDate, f64)> {
    series.dated().filter_map(|(d, o)| o.rate.map(|y| (d, y))).collect()
}

#[derive(Debug, Clone)]
struct FittedDecomposition {
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    yearly_order: usize,
    beta: DVector<f64>,
}

fn fit(history: &[(NaiveDate, f64)], config: &DecompositionConfig) -> Result<FittedDecomposition, ForecastError> {
    let distinct = count_distinct_dates(history);
    if distinct < MIN_DISTINCT_DATES {
        return Err(ForecastError::Fit(format!(
            "need at least {MIN_DISTINCT_DATES} observations with distinct dates, got {distinct}"
        )));
    }

    // `project` preserves the series order, which is date ascending.
    let start = history[0].0;
    let end = history[history.len() - 1].0;
    let span_days = (end - start).num_days() as f64;

    let y_scale = history.iter().map(|(_, y)| y.abs()).fold(0.0, f64::max);
    let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

    let ts: Vec<f64> = history
        .iter()
        .map(|(d, _)| (*d - start).num_days() as f64 / span_days)
        .collect();
    let changepoints = place_changepoints(&ts, config);

    let yearly_order = if (end - start).num_days() >= config.yearly_min_span_days {
        config.yearly_order
    } else {
        0
    };

    let n = history.len();
    let p = 2 + changepoints.len() + 2 * yearly_order;
    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut row = Vec::with_capacity(p);
    for (i, ((d, _), t)) in history.iter().zip(&ts).enumerate() {
        row.clear();
        fill_design_row(*d, *t, &changepoints, yearly_order, &mut row);
        for (j, v) in row.iter().enumerate() {
            x[(i, j)] = *v;
        }
    }
    let y = DVector::from_iterator(n, history.iter().map(|(_, y)| y / y_scale));

    let cp_penalty = (config.observation_noise / config.changepoint_prior_scale).powi(2);
    let season_penalty = (config.observation_noise / config.seasonality_prior_scale).powi(2);
    let mut penalties = vec![0.0, 0.0];
    penalties.extend(std::iter::repeat_n(cp_penalty, changepoints.len()));
    penalties.extend(std::iter::repeat_n(season_penalty, 2 * yearly_order));

    let beta = solve_penalized_least_squares(&x, &y, &penalties)
        .ok_or_else(|| ForecastError::Fit("least squares solve did not converge".to_string()))?;

    info!(
        observations = n,
        changepoints = changepoints.len(),
        yearly_order,
        "decomposition model fitted"
    );

    Ok(FittedDecomposition {
        start,
        span_days,
        y_scale,
        changepoints,
        yearly_order,
        beta,
    })
}

impl FittedDecomposition {
    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    /// `(trend, yearly)` in original units.
    fn components(&self, date: NaiveDate) -> (f64, f64) {
        let t = self.scaled_time(date);
        let n_cp = self.changepoints.len();
        let beta = self.beta.as_slice();

        let trend = piecewise_trend(t, beta[1], beta[0], &self.changepoints, &beta[2..2 + n_cp]);

        let mut fourier = Vec::with_capacity(2 * self.yearly_order);
        push_fourier_terms(epoch_days(date), YEAR_DAYS, self.yearly_order, &mut fourier);
        let yearly: f64 = fourier.iter().zip(&beta[2 + n_cp..]).map(|(f, b)| f * b).sum();

        (trend * self.y_scale, yearly * self.y_scale)
    }

    fn frame(&self, history: &[(NaiveDate, f64)], history_end: NaiveDate, horizon: usize) -> DecompositionFrame {
        let future = future_month_dates(history_end, horizon);

        let rows = history
            .iter()
            .map(|(d, _)| *d)
            .chain(future)
            .map(|ds| {
                let (trend, yearly) = self.components(ds);
                FrameRow {
                    ds,
                    trend,
                    yearly,
                    yhat: trend + yearly,
                }
            })
            .collect();

        debug!(history_end = %history_end, horizon, "decomposition frame built");
        DecompositionFrame { history_end, rows }
    }
}

fn fill_design_row(date: NaiveDate, t: f64, changepoints: &[f64], yearly_order: usize, out: &mut Vec<f64>) {
    out.push(1.0);
    out.push(t);
    out.extend(changepoints.iter().map(|s| hinge(t, *s)));
    push_fourier_terms(epoch_days(date), YEAR_DAYS, yearly_order, out);
}

/// Changepoints at evenly spaced history positions inside `changepoint_range`.
///
/// The first position is skipped (a hinge at `t = 0` duplicates the base slope).
fn place_changepoints(ts: &[f64], config: &DecompositionConfig) -> Vec<f64> {
    let hist_size = (ts.len() as f64 * config.changepoint_range).floor() as usize;
    let n_cp = config.n_changepoints.min(hist_size.saturating_sub(1));
    if n_cp == 0 {
        return Vec::new();
    }

    let last = (hist_size - 1) as f64;
    let mut cps: Vec<f64> = (1..=n_cp)
        .map(|k| {
            let idx = (last * k as f64 / n_cp as f64).round() as usize;
            ts[idx]
        })
        .filter(|t| *t > 0.0 && *t < 1.0)
        .collect();
    cps.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
    cps
}

fn count_distinct_dates(history: &[(NaiveDate, f64)]) -> usize {
    let mut dates: Vec<NaiveDate> = history.iter().map(|(d, _)| *d).collect();
    dates.sort_unstable();
    dates.dedup();
    dates.len()
}

fn epoch_days(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}
