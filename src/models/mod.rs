//! Forecast backends.
//!
//! Both backends implement `Forecaster`; `Backend` is the tagged enum used to pick
//! one at runtime.

pub mod artifact;
pub mod decomposition;
pub mod regression;
pub mod traits;

pub use artifact::*;
pub use decomposition::*;
pub use regression::*;
pub use traits::*;

use crate::domain::{BackendKind, ForecastConfig, Series};
use crate::error::ForecastError;
use crate::forecast::RawForecast;

/// A selected backend instance.
#[derive(Debug)]
pub enum Backend {
    TrendRegression(TrendRegressionBackend),
    Decomposition(DecompositionBackend),
}

impl Backend {
    /// Build the backend of the given kind from run configuration.
    pub fn from_config(kind: BackendKind, config: &ForecastConfig) -> Self {
        match kind {
            BackendKind::TrendRegression => {
                Backend::TrendRegression(TrendRegressionBackend::new(ArtifactFile::new(&config.model_path)))
            }
            BackendKind::Decomposition => Backend::Decomposition(DecompositionBackend::new(config.decomposition)),
        }
    }
}

impl Forecaster for Backend {
    fn kind(&self) -> BackendKind {
        match self {
            Backend::TrendRegression(b) => b.kind(),
            Backend::Decomposition(b) => b.kind(),
        }
    }

    fn forecast_raw(&self, series: &Series, horizon: usize) -> Result<RawForecast, ForecastError> {
        match self {
            Backend::TrendRegression(b) => b.forecast_raw(series, horizon),
            Backend::Decomposition(b) => b.forecast_raw(series, horizon),
        }
    }
}
