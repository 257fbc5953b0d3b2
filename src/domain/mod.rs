//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the observation/series model produced by ingest (`Observation`, `Series`)
//! - encoder and backend exchange types (`FeatureRow`, `ForecastPoint`, `ForecastResult`)
//! - backend selection and run configuration (`BackendKind`, `ForecastConfig`)

pub mod types;

pub use types::*;
