//! The scheduled forecast run: generate, persist, check, alert.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use fleetpulse_store::NewForecastSnapshot;

use crate::engine::ForecastEngine;
use crate::error::ForecastError;
use crate::notify::{NotificationKind, Notifier};

/// Summary of one forecast run.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastRunReport {
    /// Number of per-date forecasts generated and persisted
    pub forecasts: usize,
    /// Whether a drop alert was dispatched and delivered
    pub alerted: bool,
    /// The alert message, when the drop check fired
    pub message: Option<String>,
}

/// Run the full forecast pipeline once.
///
/// Generates `days` forecasts and appends one snapshot per target date;
/// snapshot history accumulates across runs so the drop check can compare
/// this run against the previous one. Then runs the drop check and
/// dispatches the alert message when it fires.
pub async fn run_forecast_job(
    engine: &ForecastEngine,
    notifier: &dyn Notifier,
    days: u32,
    now: DateTime<Utc>,
) -> Result<ForecastRunReport, ForecastError> {
    let forecasts = engine.generate_forecast(days, now).await?;

    for forecast in &forecasts {
        engine
            .snapshots
            .insert_snapshot(NewForecastSnapshot {
                target_date: forecast.target_date,
                generated_at: now,
                available_bus_count: forecast.available_bus_count,
                unavailable_bus_count: forecast.unavailable_bus_count,
                high_risk_bus_count: forecast.high_risk_bus_count,
                metadata: json!({ "highRiskBuses": forecast.high_risk_buses }),
            })
            .await?;
    }

    let drop_check = engine.check_availability_drop(now).await;
    let mut alerted = false;
    if drop_check.should_alert {
        if let Some(message) = &drop_check.message {
            alerted = notifier.send(message, NotificationKind::ForecastUpdate).await;
        }
    }

    info!(
        forecasts = forecasts.len(),
        alerted,
        "forecast run completed"
    );

    Ok(ForecastRunReport {
        forecasts: forecasts.len(),
        alerted,
        message: drop_check.message,
    })
}
