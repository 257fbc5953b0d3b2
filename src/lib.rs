//! `unemployment-forecast` library crate.
//!
//! The binary (`ur`) is a thin wrapper around this library so that:
//!
//! - ingest, feature encoding and both forecasting backends are testable without spawning processes
//! - a display layer (notebook, dashboard) can reuse the session and result types directly

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod features;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
