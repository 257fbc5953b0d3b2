//! Shared forecast pipeline used by every CLI command.
//!
//! A `ForecastSession` owns the normalized series for one session. Commands borrow
//! it read-only: region filters and backends produce new values and never touch the
//! session's series. One session serves one caller at a time; concurrent callers
//! each get their own session.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{BackendKind, ForecastConfig, ForecastResult, Series};
use crate::error::ForecastError;
use crate::io::ingest::{NormalizedData, load_series};
use crate::models::{Backend, Forecaster};

#[derive(Debug, Clone)]
pub struct ForecastSession {
    data: NormalizedData,
}

impl ForecastSession {
    /// Load and normalize the data file. Schema failures abort here.
    pub fn open(path: &Path) -> Result<Self, ForecastError> {
        let data = load_series(path)?;
        info!(rows = data.rows_read, "session opened");
        Ok(Self { data })
    }

    pub fn from_data(data: NormalizedData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &NormalizedData {
        &self.data
    }

    pub fn series(&self) -> &Series {
        &self.data.series
    }

    /// The series a forecast runs on: one region, or the whole dataset.
    pub fn scoped_series(&self, region: Option<&str>) -> Result<Series, ForecastError> {
        let Some(region) = region else {
            return Ok(self.data.series.clone());
        };
        let filtered = self.data.series.filter_region(region);
        if filtered.is_empty() {
            return Err(ForecastError::InvalidParameter(format!("unknown region '{region}'")));
        }
        Ok(filtered)
    }

    /// Run one backend on the scoped series.
    pub fn forecast(&self, kind: BackendKind, config: &ForecastConfig) -> Result<ForecastResult, ForecastError> {
        let series = self.scoped_series(config.region.as_deref())?;
        let backend = Backend::from_config(kind, config);
        info!(backend = %kind, observations = series.len(), "running forecast");
        backend.forecast(&series, config.horizon)
    }

    /// Run both backends; a failure in one does not affect the other.
    pub fn forecast_all(
        &self,
        config: &ForecastConfig,
    ) -> Result<Vec<(BackendKind, Result<ForecastResult, ForecastError>)>, ForecastError> {
        // Validate the scope once so an unknown region fails the whole command.
        self.scoped_series(config.region.as_deref())?;

        let mut outcomes = Vec::with_capacity(BackendKind::ALL.len());
        for kind in BackendKind::ALL {
            let outcome = self.forecast(kind, config);
            if let Err(err) = &outcome {
                if !err.is_recoverable() {
                    return Err(err.clone());
                }
                warn!(backend = %kind, error = %err, "backend failed");
            }
            outcomes.push((kind, outcome));
        }
        Ok(outcomes)
    }
}
