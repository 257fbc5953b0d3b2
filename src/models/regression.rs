//! Trend-regression backend.
//!
//! Loads the trained artifact on every request (no caching), predicts one value per
//! future feature row, and pairs predictions with monthly dates after the last
//! historical date.

use tracing::{debug, info};

use crate::domain::{BackendKind, ForecastResult, Series};
use crate::error::ForecastError;
use crate::features::{encode_future, future_month_dates};
use crate::forecast::{RawForecast, adapt};
use crate::models::artifact::{ModelSource, RegressionModel};
use crate::models::traits::Forecaster;

pub struct TrendRegressionBackend {
    source: Box<dyn ModelSource>,
}

impl TrendRegressionBackend {
    pub fn new(source: impl ModelSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }
}

impl std::fmt::Debug for TrendRegressionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendRegressionBackend")
            .field("source", &self.source.location())
            .finish()
    }
}

impl Forecaster for TrendRegressionBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::TrendRegression
    }

    fn forecast_raw(&self, series: &Series, horizon: usize) -> Result<RawForecast, ForecastError> {
        // A missing artifact is not transient: surface it immediately.
        let model = self.source.load()?;
        info!(location = %self.source.location(), "trend-regression artifact loaded");
        regression_raw(model.as_ref(), series, horizon)
    }
}

/// Forecast with an already-loaded model.
pub fn forecast_with_model(
    model: &dyn RegressionModel,
    series: &Series,
    horizon: usize,
) -> Result<ForecastResult, ForecastError> {
    let raw = regression_raw(model, series, horizon)?;
    adapt(raw, BackendKind::TrendRegression, horizon)
}

fn regression_raw(model: &dyn RegressionModel, series: &Series, horizon: usize) -> Result<RawForecast, ForecastError> {
    let last = series.last_date().ok_or(ForecastError::EmptyHistory)?;

    let rows = encode_future(series, horizon);
    let predictions = model.predict(&rows)?;
    if predictions.len() != rows.len() {
        return Err(ForecastError::InvalidOutput(format!(
            "model returned {} predictions for {} feature rows",
            predictions.len(),
            rows.len()
        )));
    }
    debug!(
        first_time_index = rows.first().map(|r| r.time_index),
        n = rows.len(),
        "trend-regression predictions computed"
    );

    Ok(RawForecast::Regression {
        dates: future_month_dates(last, horizon),
        predictions,
    })
}
