//! FleetPulse - bus availability forecasting CLI
//!
//! The `fleetpulse` command drives the forecasting pipeline against the
//! configured SurrealDB backend.
//!
//! ## Commands
//!
//! - `run`: Generate forecasts, persist snapshots, and run the drop check
//! - `predict`: Project availability for a single date
//! - `check`: Run the day-over-day availability drop check
//! - `prune`: Delete forecast snapshots for a target date

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, Level};

use fleetpulse_forecast::{run_forecast_job, ForecastEngine, LogNotifier};
use fleetpulse_store::{ForecastStore, SurrealFleetStore};

#[derive(Parser)]
#[command(name = "fleetpulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bus availability forecasting for fleet maintenance", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate forecasts for the coming days, persist snapshots, and
    /// dispatch a drop alert if availability collapsed since the last run
    Run {
        /// Number of days to forecast
        #[arg(short, long, default_value = "7")]
        days: u32,
    },

    /// Project availability for a single target date
    Predict {
        /// Target date (YYYY-MM-DD)
        date: String,
    },

    /// Compare the two most recent forecasts for tomorrow
    Check,

    /// Delete all forecast snapshots for a target date
    Prune {
        /// Target date (YYYY-MM-DD)
        date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let store = Arc::new(
        SurrealFleetStore::from_env()
            .await
            .context("Failed to connect to FleetPulse database")?,
    );
    let engine = ForecastEngine::new(store.clone(), store.clone());

    match cli.command {
        Commands::Run { days } => cmd_run(&engine, days).await,
        Commands::Predict { date } => cmd_predict(&engine, &date).await,
        Commands::Check => cmd_check(&engine).await,
        Commands::Prune { date } => cmd_prune(store.as_ref(), &date).await,
    }
}

fn init_tracing(json: bool, level: Level) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn parse_date(date: &str) -> Result<chrono::DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
    Ok(day.and_time(NaiveTime::MIN).and_utc())
}

/// Generate and persist forecasts, then run the drop check
async fn cmd_run(engine: &ForecastEngine, days: u32) -> Result<()> {
    let notifier = LogNotifier::new();
    let report = run_forecast_job(engine, &notifier, days, Utc::now()).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(message) = &report.message {
        println!("{}", message);
    }

    Ok(())
}

/// Project availability for one date
async fn cmd_predict(engine: &ForecastEngine, date: &str) -> Result<()> {
    let target_date = parse_date(date)?;
    let result = engine.predict_for_date(target_date, Utc::now()).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Run the drop check without generating new forecasts
async fn cmd_check(engine: &ForecastEngine) -> Result<()> {
    let check = engine.check_availability_drop(Utc::now()).await;

    match check.message {
        Some(message) => println!("{}", message),
        None => println!("No significant availability drop for tomorrow"),
    }
    Ok(())
}

/// Delete snapshots for a date
async fn cmd_prune(store: &SurrealFleetStore, date: &str) -> Result<()> {
    let target_date = parse_date(date)?;
    let deleted = store.delete_snapshots(target_date).await?;

    info!(%target_date, deleted, "pruned forecast snapshots");
    println!("Deleted {} snapshot(s) for {}", deleted, date);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_to_utc_midnight() {
        let parsed = parse_date("2026-03-15").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-03-15T00:00:00+00:00");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("15/03/2026").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }
}
