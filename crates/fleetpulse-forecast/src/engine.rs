//! Forecast orchestration: multi-day generation and drop detection.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use fleetpulse_store::{FleetStore, ForecastSnapshot, ForecastStore, SnapshotFilter};

use crate::error::ForecastError;
use crate::projector::{project_for_date, ForecastResult};
use crate::time::start_of_day;

/// Alert when tomorrow's available count dropped by at least this many buses
/// between the two most recent forecast snapshots.
pub const AVAILABILITY_DROP_THRESHOLD: i64 = 5;

/// Outcome of a day-over-day availability drop check.
#[derive(Debug, Clone, PartialEq)]
pub struct DropCheck {
    pub should_alert: bool,
    pub message: Option<String>,
}

impl DropCheck {
    fn quiet() -> Self {
        DropCheck {
            should_alert: false,
            message: None,
        }
    }
}

/// Deterministic availability forecasting engine.
///
/// Every entry point takes an explicit `now`; the engine never reads the
/// wall clock, which keeps forecasts reproducible under test.
pub struct ForecastEngine {
    fleet: Arc<dyn FleetStore>,
    pub(crate) snapshots: Arc<dyn ForecastStore>,
}

impl ForecastEngine {
    pub fn new(fleet: Arc<dyn FleetStore>, snapshots: Arc<dyn ForecastStore>) -> Self {
        Self { fleet, snapshots }
    }

    /// Project availability for a single target date.
    pub async fn predict_for_date(
        &self,
        target_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ForecastResult {
        project_for_date(self.fleet.as_ref(), target_date, now).await
    }

    /// Generate projections for the next `days` consecutive dates, ordered
    /// by target date ascending.
    ///
    /// Metrics and garage durations are recomputed for every date; the cost
    /// scales linearly with `days x buses x garages`.
    pub async fn generate_forecast(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<ForecastResult>, ForecastError> {
        if days == 0 {
            return Err(ForecastError::InvalidDays { days });
        }

        let mut results = Vec::with_capacity(days as usize);
        for i in 1..=i64::from(days) {
            let target_date = start_of_day(now + Duration::days(i));
            results.push(self.predict_for_date(target_date, now).await);
        }

        info!(days, "generated forecast");
        Ok(results)
    }

    /// Compare the two most recent snapshots for tomorrow's date.
    ///
    /// Alerts when the available count dropped by at least
    /// [`AVAILABILITY_DROP_THRESHOLD`] between them. This is a two-sample
    /// trend detector: any single regeneration swing that large fires it.
    /// Fails silently (no alert, no error) when fewer than two snapshots
    /// exist or a fetch fails.
    pub async fn check_availability_drop(&self, now: DateTime<Utc>) -> DropCheck {
        let tomorrow = start_of_day(now + Duration::days(1));

        let Some(recent) = self.latest_snapshot(tomorrow, None).await else {
            return DropCheck::quiet();
        };
        let Some(previous) = self
            .latest_snapshot(tomorrow, Some(recent.generated_at))
            .await
        else {
            return DropCheck::quiet();
        };

        let drop = i64::from(previous.available_bus_count) - i64::from(recent.available_bus_count);
        if drop >= AVAILABILITY_DROP_THRESHOLD {
            return DropCheck {
                should_alert: true,
                message: Some(format!(
                    "⚠️ Forecast Alert: Available buses for tomorrow dropped by {} (from {} to {})",
                    drop, previous.available_bus_count, recent.available_bus_count
                )),
            };
        }

        DropCheck::quiet()
    }

    async fn latest_snapshot(
        &self,
        target_date: DateTime<Utc>,
        generated_before: Option<DateTime<Utc>>,
    ) -> Option<ForecastSnapshot> {
        let filter = SnapshotFilter {
            target_date,
            generated_before,
        };
        match self.snapshots.list_snapshots(filter, 1).await {
            Ok(mut snaps) if !snaps.is_empty() => Some(snaps.remove(0)),
            Ok(_) => None,
            Err(err) => {
                warn!(%err, "snapshot fetch failed, skipping drop check");
                None
            }
        }
    }
}
