//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed read-only between the normalizer, encoder and backends
//! - exported to JSON/CSV for the display layer
//! - reloaded later for display

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of future monthly periods every forecast produces.
pub const HORIZON: usize = 12;

/// Canonical label of the rate column after renaming.
pub const RATE_COLUMN: &str = "Unemployment Rate";

/// Which forecasting backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Pre-trained tree ensemble over `{Month, Time}` features.
    TrendRegression,
    /// Additive trend + yearly seasonality fitted per request.
    Decomposition,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::TrendRegression, BackendKind::Decomposition];

    pub fn id(self) -> &'static str {
        match self {
            BackendKind::TrendRegression => "trend-regression",
            BackendKind::Decomposition => "decomposition",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BackendKind::TrendRegression => "Trend regression (tree ensemble)",
            BackendKind::Decomposition => "Additive decomposition",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Parsed observation date.
///
/// Unparseable cells are kept (with their raw text) so the row still counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservationDate {
    Parsed(NaiveDate),
    Unparseable(String),
}

impl ObservationDate {
    pub fn parsed(&self) -> Option<NaiveDate> {
        match self {
            ObservationDate::Parsed(d) => Some(*d),
            ObservationDate::Unparseable(_) => None,
        }
    }
}

/// One row of the historical series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// 1-based source line (header is line 1).
    pub line: usize,
    pub date: ObservationDate,
    pub region: String,
    /// Percentage rate; `None` when the cell was missing or invalid.
    pub rate: Option<f64>,
    month: Option<u32>,
    year: Option<i32>,
}

impl Observation {
    /// Build an observation, deriving `month`/`year` from the date once.
    pub fn new(line: usize, date: ObservationDate, region: impl Into<String>, rate: Option<f64>) -> Self {
        let parsed = date.parsed();
        Self {
            line,
            month: parsed.map(|d| d.month()),
            year: parsed.map(|d| d.year()),
            date,
            region: region.into(),
            rate,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.parsed()
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// Observations ordered by date ascending; undated rows sort last.
///
/// A `Series` is never mutated after construction: filters return new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Sort (stable) and wrap observations.
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Observations with a parsed date, in date order.
    pub fn dated(&self) -> impl Iterator<Item = (NaiveDate, &Observation)> {
        self.observations
            .iter()
            .filter_map(|o| o.parsed_date().map(|d| (d, o)))
    }

    /// Latest parsed date, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dated().map(|(d, _)| d).last()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dated().map(|(d, _)| d).next()
    }

    /// New series restricted to one region (exact label match).
    pub fn filter_region(&self, region: &str) -> Series {
        Series {
            observations: self
                .observations
                .iter()
                .filter(|o| o.region == region)
                .cloned()
                .collect(),
        }
    }

    /// Rates of dated observations with `from <= date < to`.
    ///
    /// Undated rows never fall inside a date bound.
    pub fn rates_between(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<f64> {
        self.dated()
            .filter(|(d, _)| from.is_none_or(|f| *d >= f) && to.is_none_or(|t| *d < t))
            .filter_map(|(_, o)| o.rate)
            .collect()
    }
}

/// Feature row consumed by the trend-regression artifact (`{Month, Time}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Time")]
    pub time_index: usize,
}

/// One predicted future period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Uniform forecast output, regardless of backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub backend: BackendKind,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Tuning knobs for the decomposition backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecompositionConfig {
    /// Maximum number of potential trend changepoints.
    pub n_changepoints: usize,
    /// Share of history (from the start) in which changepoints may sit.
    pub changepoint_range: f64,
    /// Prior scale of trend changes (smaller = stiffer trend).
    pub changepoint_prior_scale: f64,
    /// Prior scale of seasonal coefficients.
    pub seasonality_prior_scale: f64,
    /// Assumed observation noise on the scaled series.
    pub observation_noise: f64,
    /// Fourier order of the yearly component.
    pub yearly_order: usize,
    /// Minimum history span (days) before yearly seasonality is enabled.
    pub yearly_min_span_days: i64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            observation_noise: 0.05,
            yearly_order: 10,
            yearly_min_span_days: 730,
        }
    }
}

/// Resolved run configuration (CLI args + environment defaults).
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub backend: BackendKind,
    pub region: Option<String>,
    pub horizon: usize,
    pub decomposition: DecompositionConfig,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
