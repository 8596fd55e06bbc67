//! Per-garage historical repair duration estimation.

use chrono::{DateTime, Utc};
use tracing::warn;

use fleetpulse_store::{FleetStore, GarageId, MaintenanceEventFilter, MaintenanceStatus};

use crate::time::{hours_between, window_start};

/// Conservative default when a garage has no qualifying history.
///
/// Downstream completion-date math depends on this exact constant; do not
/// tune it without revisiting the projector's maintenance branch.
pub const DEFAULT_REPAIR_HOURS: f64 = 24.0;

/// Mean repair duration in hours for one garage.
///
/// Qualifying events: Completed with a completion timestamp, started within
/// the trailing 30-day window. Returns [`DEFAULT_REPAIR_HOURS`] when no
/// events qualify or the fetch fails.
pub async fn average_repair_hours(
    store: &dyn FleetStore,
    garage_id: &GarageId,
    now: DateTime<Utc>,
) -> f64 {
    let filter = MaintenanceEventFilter {
        bus_id: None,
        garage_id: Some(garage_id.clone()),
        started_after: Some(window_start(now)),
        status: Some(MaintenanceStatus::Completed),
    };

    let events = match store.list_maintenance_events(filter).await {
        Ok(events) => events,
        Err(err) => {
            warn!(%err, %garage_id, "repair history fetch failed, using default duration");
            return DEFAULT_REPAIR_HOURS;
        }
    };

    let durations: Vec<f64> = events
        .iter()
        .filter_map(|e| e.completed_at.map(|done| hours_between(e.started_at, done)))
        .collect();

    if durations.is_empty() {
        return DEFAULT_REPAIR_HOURS;
    }

    durations.iter().sum::<f64>() / durations.len() as f64
}
