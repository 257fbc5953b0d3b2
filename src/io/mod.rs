//! Input/output helpers.
//!
//! - CSV ingest + normalization (`ingest`)
//! - forecast and training-frame CSV exports (`export`)
//! - forecast JSON read/write (`forecast_json`)

pub mod export;
pub mod forecast_json;
pub mod ingest;

pub use export::*;
pub use forecast_json::*;
pub use ingest::*;
