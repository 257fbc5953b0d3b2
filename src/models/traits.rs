//! Forecaster trait shared by both backends.

use crate::domain::{BackendKind, ForecastResult, Series};
use crate::error::ForecastError;
use crate::forecast::{RawForecast, adapt};

/// Common interface for the forecasting backends.
pub trait Forecaster {
    /// Backend identifier attached to every result.
    fn kind(&self) -> BackendKind;

    /// Backend-specific output before normalization.
    fn forecast_raw(&self, series: &Series, horizon: usize) -> Result<RawForecast, ForecastError>;

    /// Forecast `horizon` monthly periods after the series.
    fn forecast(&self, series: &Series, horizon: usize) -> Result<ForecastResult, ForecastError> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter("horizon must be at least 1".to_string()));
        }
        let raw = self.forecast_raw(series, horizon)?;
        adapt(raw, self.kind(), horizon)
    }
}
