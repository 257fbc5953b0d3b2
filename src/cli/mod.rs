//! Command-line parsing for the unemployment forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! forecasting code. Paths left unset fall back to `UR_DATA_PATH` / `UR_MODEL_PATH`
//! (a `.env` file is honored) and then to built-in defaults.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::BackendKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ur", version, about = "Unemployment rate explorer with 12-month forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast the next 12 months with one backend.
    Forecast(ForecastArgs),
    /// Run both backends on the same series and report each outcome.
    Compare(ForecastArgs),
    /// Mean rate around a cutoff date, monthly profile, and a per-region snapshot.
    Overview(OverviewArgs),
    /// List regions, or summarize one region's rates.
    Region(RegionArgs),
    /// Export the `Month,Time,Unemployment Rate` training frame.
    Features(FeaturesArgs),
    /// Print a previously exported forecast JSON.
    Show(ShowArgs),
}

/// Input table location.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Unemployment CSV (default: $UR_DATA_PATH or `unemployment_data.csv`).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,
}

/// Options for forecasting.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Forecasting backend.
    #[arg(short = 'b', long, value_enum, default_value_t = BackendKind::TrendRegression)]
    pub backend: BackendKind,

    /// Trained trend-regression artifact (default: $UR_MODEL_PATH or `models/rf_model.json`).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Restrict the forecast to one region (default: whole dataset).
    #[arg(short = 'r', long)]
    pub region: Option<String>,

    /// Export forecast points to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the forecast result to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for the overview.
#[derive(Debug, Args, Clone)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Split date for the before/after comparison.
    #[arg(long, default_value = "2020-03-01")]
    pub cutoff: NaiveDate,

    /// Date for the per-region snapshot (default: latest date).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Options for regional analysis.
#[derive(Debug, Args, Clone)]
pub struct RegionArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Region to summarize; lists regions when omitted.
    pub name: Option<String>,
}

/// Options for the training-frame export.
#[derive(Debug, Args, Clone)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Restrict to one region.
    #[arg(short = 'r', long)]
    pub region: Option<String>,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

/// Options for printing a saved forecast.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Forecast JSON produced by `ur forecast --export-json`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,
}
