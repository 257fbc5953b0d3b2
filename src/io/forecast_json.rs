//! Read/write forecast JSON files.
//!
//! The JSON file is the output contract handed to the display layer:
//!
//! ```text
//! {"backend": "decomposition", "points": [{"date": "2020-07-31", "value": 8.1}, ...]}
//! ```

use std::fs::File;
use std::path::Path;

use crate::domain::ForecastResult;
use crate::error::AppError;

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;
    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    let result: ForecastResult =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{BackendKind, ForecastPoint};

    #[test]
    fn json_matches_output_contract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        let result = ForecastResult {
            backend: BackendKind::Decomposition,
            points: vec![ForecastPoint {
                date: NaiveDate::from_ymd_opt(2020, 7, 31).unwrap(),
                value: 8.25,
            }],
        };
        write_forecast_json(&path, &result).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["backend"], "decomposition");
        assert_eq!(value["points"][0]["date"], "2020-07-31");
        assert_eq!(value["points"][0]["value"], 8.25);

        assert_eq!(read_forecast_json(&path).unwrap(), result);
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        std::fs::write(&path, "{}").unwrap();
        let err = read_forecast_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
