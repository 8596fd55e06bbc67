//! Per-bus metrics aggregation over the trailing 30-day window.

use chrono::{DateTime, Utc};
use tracing::warn;

use fleetpulse_store::{
    BusId, BusStatus, FleetStore, GarageId, IncidentFilter, MaintenanceEventFilter,
    MaintenanceStatus, Severity,
};

use crate::time::window_start;

/// Derived per-bus metrics tuple. Constructed fresh on every forecast call,
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMetrics {
    pub bus_id: BusId,
    pub fleet_number: String,
    pub status: BusStatus,
    pub garage_id: GarageId,
    /// Maintenance events started within the trailing window, any severity
    pub maintenance_events_last_30_days: u32,
    /// Incidents reported within the trailing window
    pub incidents_last_30_days: u32,
    /// Open Critical/High maintenance events; an open-backlog count, not
    /// bounded by the trailing window
    pub open_critical_high_events: u32,
}

/// Collect one metrics record per bus.
///
/// The three underlying reads are independent and fanned out concurrently.
/// Fail-open: if the bus fetch fails, an empty set is returned (callers
/// treat zero buses as "no data"); if the event or incident fetch fails,
/// the corresponding counts are zero.
pub async fn collect_bus_metrics(store: &dyn FleetStore, now: DateTime<Utc>) -> Vec<BusMetrics> {
    let since = window_start(now);

    // Maintenance events are fetched unwindowed: the open-backlog count
    // covers events of any age, only the recent-events count is windowed.
    let (buses, events, incidents) = tokio::join!(
        store.list_buses(),
        store.list_maintenance_events(MaintenanceEventFilter::default()),
        store.list_incidents(IncidentFilter {
            bus_id: None,
            reported_after: Some(since),
        }),
    );

    let buses = match buses {
        Ok(buses) => buses,
        Err(err) => {
            warn!(%err, "bus fetch failed, returning empty metrics set");
            return Vec::new();
        }
    };
    let events = events.unwrap_or_else(|err| {
        warn!(%err, "maintenance event fetch failed, counting none");
        Vec::new()
    });
    let incidents = incidents.unwrap_or_else(|err| {
        warn!(%err, "incident fetch failed, counting none");
        Vec::new()
    });

    buses
        .into_iter()
        .map(|bus| {
            let recent_events = events
                .iter()
                .filter(|e| e.bus_id == bus.id && e.started_at >= since)
                .count() as u32;
            let open_critical_high = events
                .iter()
                .filter(|e| {
                    e.bus_id == bus.id
                        && e.status != MaintenanceStatus::Completed
                        && matches!(e.severity, Severity::Critical | Severity::High)
                })
                .count() as u32;
            let recent_incidents =
                incidents.iter().filter(|i| i.bus_id == bus.id).count() as u32;

            BusMetrics {
                bus_id: bus.id,
                fleet_number: bus.fleet_number,
                status: bus.status,
                garage_id: bus.garage_id,
                maintenance_events_last_30_days: recent_events,
                incidents_last_30_days: recent_incidents,
                open_critical_high_events: open_critical_high,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fleetpulse_store::fakes::{FailingFleetStore, MemoryFleetStore};
    use fleetpulse_store::{Bus, Incident, MaintenanceEvent};

    fn fleet_bus(store: &MemoryFleetStore, fleet_number: &str) -> (BusId, GarageId) {
        let bus_id = BusId::new();
        let garage_id = GarageId::new();
        store.add_bus(Bus {
            id: bus_id.clone(),
            fleet_number: fleet_number.to_string(),
            garage_id: garage_id.clone(),
            status: BusStatus::Available,
            mileage: None,
        });
        (bus_id, garage_id)
    }

    fn add_event(
        store: &MemoryFleetStore,
        bus_id: &BusId,
        garage_id: &GarageId,
        severity: Severity,
        status: MaintenanceStatus,
        started_days_ago: i64,
        now: DateTime<Utc>,
    ) {
        store.add_maintenance_event(MaintenanceEvent {
            id: uuid::Uuid::new_v4().to_string(),
            bus_id: bus_id.clone(),
            garage_id: garage_id.clone(),
            severity,
            status,
            description: "test event".to_string(),
            started_at: now - Duration::days(started_days_ago),
            completed_at: None,
        });
    }

    #[tokio::test]
    async fn counts_windowed_events_and_incidents() {
        let store = MemoryFleetStore::new();
        let now = Utc::now();
        let (bus_id, garage_id) = fleet_bus(&store, "BUS-001");

        add_event(&store, &bus_id, &garage_id, Severity::Low, MaintenanceStatus::Completed, 5, now);
        add_event(&store, &bus_id, &garage_id, Severity::Low, MaintenanceStatus::Completed, 45, now);
        for days_ago in [5, 10, 15] {
            store.add_incident(Incident {
                id: uuid::Uuid::new_v4().to_string(),
                bus_id: bus_id.clone(),
                garage_id: garage_id.clone(),
                severity: Severity::Medium,
                description: "test incident".to_string(),
                reported_at: now - Duration::days(days_ago),
            });
        }

        let metrics = collect_bus_metrics(&store, now).await;
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].maintenance_events_last_30_days, 1);
        assert_eq!(metrics[0].incidents_last_30_days, 3);
    }

    #[tokio::test]
    async fn open_backlog_count_is_not_window_bounded() {
        let store = MemoryFleetStore::new();
        let now = Utc::now();
        let (bus_id, garage_id) = fleet_bus(&store, "BUS-001");

        // Started 60 days ago, still open: outside the window, counted anyway.
        add_event(&store, &bus_id, &garage_id, Severity::Critical, MaintenanceStatus::New, 60, now);
        add_event(&store, &bus_id, &garage_id, Severity::High, MaintenanceStatus::InProgress, 3, now);
        // Open but Medium: not counted.
        add_event(&store, &bus_id, &garage_id, Severity::Medium, MaintenanceStatus::New, 3, now);
        // Critical but completed: not counted.
        add_event(&store, &bus_id, &garage_id, Severity::Critical, MaintenanceStatus::Completed, 3, now);

        let metrics = collect_bus_metrics(&store, now).await;
        assert_eq!(metrics[0].open_critical_high_events, 2);
    }

    #[tokio::test]
    async fn failed_bus_fetch_yields_empty_set() {
        let store = FailingFleetStore::new();
        let metrics = collect_bus_metrics(&store, Utc::now()).await;
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn bus_with_no_history_has_zero_counts() {
        let store = MemoryFleetStore::new();
        let now = Utc::now();
        fleet_bus(&store, "BUS-001");

        let metrics = collect_bus_metrics(&store, now).await;
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].maintenance_events_last_30_days, 0);
        assert_eq!(metrics[0].incidents_last_30_days, 0);
        assert_eq!(metrics[0].open_critical_high_events, 0);
    }
}
