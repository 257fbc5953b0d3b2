//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - opens a forecast session over the data file
//! - runs forecasts / aggregates
//! - prints reports and writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DataArgs, FeaturesArgs, ForecastArgs, OverviewArgs, RegionArgs, ShowArgs};
use crate::domain::{DecompositionConfig, ForecastConfig, HORIZON};
use crate::error::AppError;

pub mod pipeline;

use pipeline::ForecastSession;

const DEFAULT_DATA_PATH: &str = "unemployment_data.csv";
const DEFAULT_MODEL_PATH: &str = "models/rf_model.json";
const ENV_DATA_PATH: &str = "UR_DATA_PATH";
const ENV_MODEL_PATH: &str = "UR_MODEL_PATH";

/// Entry point for the `ur` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Compare(args) => handle_compare(args),
        Command::Overview(args) => handle_overview(args),
        Command::Region(args) => handle_region(args),
        Command::Features(args) => handle_features(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let session = ForecastSession::open(&config.data_path)?;
    println!("{}", crate::report::format_data_summary(session.data()));

    let result = session.forecast(config.backend, &config)?;
    println!("{}", crate::report::format_forecast(&result, config.region.as_deref()));

    if let Some(path) = &config.export_csv {
        crate::io::export::write_forecast_csv(path, &result)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::forecast_json::write_forecast_json(path, &result)?;
    }
    Ok(())
}

fn handle_compare(args: ForecastArgs) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args);
    let session = ForecastSession::open(&config.data_path)?;
    println!("{}", crate::report::format_data_summary(session.data()));

    let outcomes = session.forecast_all(&config)?;
    println!("{}", crate::report::format_comparison(&outcomes));

    // One working backend is enough for the command to succeed.
    if outcomes.iter().any(|(_, outcome)| outcome.is_ok()) {
        return Ok(());
    }
    match outcomes.into_iter().find_map(|(_, outcome)| outcome.err()) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn handle_overview(args: OverviewArgs) -> Result<(), AppError> {
    let session = ForecastSession::open(&resolve_data_path(&args.data))?;
    let series = session.series();
    println!("{}", crate::report::format_data_summary(session.data()));

    let comparison = crate::report::compare_periods(series, args.cutoff);
    let profile = crate::report::monthly_profile(series);
    println!("{}", crate::report::format_overview(&comparison, &profile));

    if let Some(date) = args.date {
        if !crate::report::available_dates(series).contains(&date) {
            return Err(AppError::new(2, format!("No observations dated {date}.")));
        }
    }
    if let Some(date) = args.date.or_else(|| series.last_date()) {
        let rows = crate::report::snapshot_on(series, date);
        println!("{}", crate::report::format_snapshot(date, &rows));
    }
    Ok(())
}

fn handle_region(args: RegionArgs) -> Result<(), AppError> {
    let session = ForecastSession::open(&resolve_data_path(&args.data))?;

    let Some(name) = args.name else {
        for region in crate::report::regions(session.series()) {
            println!("{region}");
        }
        return Ok(());
    };

    let summary = crate::report::summarize_region(session.series(), &name)
        .ok_or_else(|| AppError::new(3, format!("No rates found for region '{name}'.")))?;
    println!("{}", crate::report::format_region_summary(&summary));
    Ok(())
}

fn handle_features(args: FeaturesArgs) -> Result<(), AppError> {
    let session = ForecastSession::open(&resolve_data_path(&args.data))?;
    let series = session.scoped_series(args.region.as_deref())?;
    let n = crate::io::export::write_training_frame_csv(&args.out, &series)?;
    println!("Wrote {n} rows to {}", args.out.display());
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let result = crate::io::forecast_json::read_forecast_json(&args.forecast)?;
    println!("{}", crate::report::format_forecast(&result, None));
    Ok(())
}

pub fn forecast_config_from_args(args: &ForecastArgs) -> ForecastConfig {
    ForecastConfig {
        data_path: resolve_data_path(&args.data),
        model_path: args
            .model
            .clone()
            .unwrap_or_else(|| env_path(ENV_MODEL_PATH, DEFAULT_MODEL_PATH)),
        backend: args.backend,
        region: args.region.clone(),
        horizon: HORIZON,
        decomposition: DecompositionConfig::default(),
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

fn resolve_data_path(args: &DataArgs) -> PathBuf {
    args.data
        .clone()
        .unwrap_or_else(|| env_path(ENV_DATA_PATH, DEFAULT_DATA_PATH))
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BackendKind;

    #[test]
    fn explicit_paths_win_over_defaults() {
        let cli = crate::cli::Cli::parse_from([
            "ur",
            "forecast",
            "--data",
            "data/in.csv",
            "--model",
            "m.json",
            "-b",
            "decomposition",
        ]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast command");
        };
        let config = forecast_config_from_args(&args);
        assert_eq!(config.data_path, PathBuf::from("data/in.csv"));
        assert_eq!(config.model_path, PathBuf::from("m.json"));
        assert_eq!(config.backend, BackendKind::Decomposition);
        assert_eq!(config.horizon, HORIZON);
    }
}
