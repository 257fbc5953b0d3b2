//! CSV exports.
//!
//! - forecast points (`date,forecast,backend`) for spreadsheets/charts
//! - the training frame (`Month,Time,Unemployment Rate`) for the external trainer

use std::fs::File;
use std::path::Path;

use crate::domain::{ForecastResult, Series};
use crate::error::AppError;
use crate::features::encode_history;

/// Write forecast points to a CSV file.
pub fn write_forecast_csv(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["date", "forecast", "backend"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for p in &result.points {
        writer
            .write_record([p.date.to_string(), format!("{:.6}", p.value), result.backend.id().to_string()])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the ordinal-time training frame of `series` to a CSV file.
///
/// Undated rows keep their `Time` slot with an empty `Month`.
pub fn write_training_frame_csv(path: &Path, series: &Series) -> Result<usize, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create features CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let rows = encode_history(series);
    for row in &rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write features CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush features CSV: {e}")))?;
    Ok(rows.len())
}
