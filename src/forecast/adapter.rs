//! Normalize backend outputs into `ForecastResult`.
//!
//! The regression backend hands over parallel `dates`/`predictions` vectors; the
//! decomposition backend hands over a frame spanning history and future. Either way
//! the result is exactly `horizon` points, strictly increasing dates spaced one
//! calendar month apart, with finite values. Negative values pass through unchanged.

use chrono::NaiveDate;

use crate::domain::{BackendKind, ForecastPoint, ForecastResult};
use crate::error::ForecastError;
use crate::features::month_ordinal;
use crate::models::DecompositionFrame;

/// Backend output before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawForecast {
    Regression { dates: Vec<NaiveDate>, predictions: Vec<f64> },
    Decomposition(DecompositionFrame),
}

/// Convert raw backend output into the uniform result shape.
pub fn adapt(raw: RawForecast, backend: BackendKind, horizon: usize) -> Result<ForecastResult, ForecastError> {
    let points: Vec<ForecastPoint> = match raw {
        RawForecast::Regression { dates, predictions } => {
            if dates.len() != predictions.len() {
                return Err(ForecastError::InvalidOutput(format!(
                    "{} dates for {} predictions",
                    dates.len(),
                    predictions.len()
                )));
            }
            dates
                .into_iter()
                .zip(predictions)
                .map(|(date, value)| ForecastPoint { date, value })
                .collect()
        }
        RawForecast::Decomposition(frame) => frame
            .rows
            .iter()
            .filter(|r| r.ds > frame.history_end)
            .take(horizon)
            .map(|r| ForecastPoint {
                date: r.ds,
                value: r.yhat,
            })
            .collect(),
    };

    validate(&points, horizon)?;
    Ok(ForecastResult { backend, points })
}

fn validate(points: &[ForecastPoint], horizon: usize) -> Result<(), ForecastError> {
    if points.len() != horizon {
        return Err(ForecastError::InvalidOutput(format!(
            "expected {horizon} forecast points, got {}",
            points.len()
        )));
    }
    if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
        return Err(ForecastError::InvalidOutput(format!("non-finite forecast value at {}", p.date)));
    }
    for w in points.windows(2) {
        if w[1].date <= w[0].date || month_ordinal(w[1].date) - month_ordinal(w[0].date) != 1 {
            return Err(ForecastError::InvalidOutput(format!(
                "forecast dates {} and {} are not one month apart",
                w[0].date, w[1].date
            )));
        }
    }
    Ok(())
}
