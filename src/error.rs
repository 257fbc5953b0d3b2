//! Error types.
//!
//! - `ForecastError` is the library taxonomy returned by ingest, encoding, the two
//!   backends and the result adapter.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Errors produced by the forecasting pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A required column is absent after header trimming/renaming.
    #[error("schema error: missing required column `{column}`")]
    Schema { column: String },

    /// The input table could not be opened or read.
    #[error("input error: {0}")]
    Input(String),

    /// The trend-regression artifact is missing, unreadable or corrupt.
    #[error("trend-regression model unavailable at '{location}': {reason}")]
    ModelUnavailable { location: String, reason: String },

    /// The decomposition model cannot be fitted on the given history.
    #[error("decomposition fit failed: {0}")]
    Fit(String),

    /// No dated observation exists to anchor future periods.
    #[error("series has no dated observations to forecast from")]
    EmptyHistory,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A backend produced output that violates the forecast result shape.
    #[error("invalid backend output: {0}")]
    InvalidOutput(String),
}

impl ForecastError {
    /// Whether the failure is local to one forecast request (the session stays usable).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::ModelUnavailable { .. }
                | ForecastError::Fit(_)
                | ForecastError::EmptyHistory
                | ForecastError::InvalidOutput(_)
        )
    }

    /// Exit code used when the error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::Schema { .. } | ForecastError::Input(_) | ForecastError::InvalidParameter(_) => 2,
            ForecastError::Fit(_) | ForecastError::EmptyHistory => 3,
            ForecastError::InvalidOutput(_) => 4,
            ForecastError::ModelUnavailable { .. } => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let mut message = err.to_string();
        if let ForecastError::ModelUnavailable { .. } = err {
            message.push_str("\nTrain and export the artifact, or rerun with `--backend decomposition`.");
        }
        AppError::new(err.exit_code(), message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = ForecastError::Schema {
            column: "Date".to_string(),
        };
        assert_eq!(err.to_string(), "schema error: missing required column `Date`");

        let err = ForecastError::Fit("need at least 2 distinct dates, got 1".to_string());
        assert_eq!(
            err.to_string(),
            "decomposition fit failed: need at least 2 distinct dates, got 1"
        );
    }

    #[test]
    fn schema_errors_are_fatal_backend_errors_are_not() {
        assert!(!ForecastError::Schema { column: "x".into() }.is_recoverable());
        assert!(!ForecastError::Input("gone".into()).is_recoverable());
        assert!(ForecastError::Fit("sparse".into()).is_recoverable());
        assert!(
            ForecastError::ModelUnavailable {
                location: "models/rf_model.json".into(),
                reason: "not found".into(),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn model_unavailable_maps_to_app_error_with_hint() {
        let app: AppError = ForecastError::ModelUnavailable {
            location: "m.json".into(),
            reason: "not found".into(),
        }
        .into();
        assert_eq!(app.exit_code(), 5);
        assert!(app.to_string().contains("--backend decomposition"));
    }
}
