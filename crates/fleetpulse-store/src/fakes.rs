//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryFleetStore`, `MemoryForecastStore`, and
//! `FailingFleetStore` that satisfy the trait contracts without any
//! external dependencies.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryFleetStore
// ---------------------------------------------------------------------------

/// In-memory fleet store backed by plain vectors.
#[derive(Debug, Default)]
pub struct MemoryFleetStore {
    buses: Mutex<Vec<Bus>>,
    events: Mutex<Vec<MaintenanceEvent>>,
    incidents: Mutex<Vec<Incident>>,
}

impl MemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bus(&self, bus: Bus) {
        self.buses.lock().unwrap().push(bus);
    }

    pub fn add_maintenance_event(&self, event: MaintenanceEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn add_incident(&self, incident: Incident) {
        self.incidents.lock().unwrap().push(incident);
    }
}

#[async_trait]
impl FleetStore for MemoryFleetStore {
    async fn list_buses(&self) -> StoreResult<Vec<Bus>> {
        Ok(self.buses.lock().unwrap().clone())
    }

    async fn list_maintenance_events(
        &self,
        filter: MaintenanceEventFilter,
    ) -> StoreResult<Vec<MaintenanceEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|e| filter.bus_id.as_ref().map(|id| e.bus_id == *id).unwrap_or(true))
            .filter(|e| {
                filter
                    .garage_id
                    .as_ref()
                    .map(|id| e.garage_id == *id)
                    .unwrap_or(true)
            })
            .filter(|e| {
                filter
                    .started_after
                    .map(|after| e.started_at >= after)
                    .unwrap_or(true)
            })
            .filter(|e| filter.status.map(|s| e.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn list_incidents(&self, filter: IncidentFilter) -> StoreResult<Vec<Incident>> {
        let incidents = self.incidents.lock().unwrap();
        Ok(incidents
            .iter()
            .filter(|i| filter.bus_id.as_ref().map(|id| i.bus_id == *id).unwrap_or(true))
            .filter(|i| {
                filter
                    .reported_after
                    .map(|after| i.reported_at >= after)
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryForecastStore
// ---------------------------------------------------------------------------

/// In-memory snapshot store backed by a `Vec<ForecastSnapshot>`.
#[derive(Debug, Default)]
pub struct MemoryForecastStore {
    snapshots: Mutex<Vec<ForecastSnapshot>>,
}

impl MemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored snapshots, in insertion order.
    pub fn all(&self) -> Vec<ForecastSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastStore for MemoryForecastStore {
    async fn list_snapshots(
        &self,
        filter: SnapshotFilter,
        limit: usize,
    ) -> StoreResult<Vec<ForecastSnapshot>> {
        let snapshots = self.snapshots.lock().unwrap();
        let mut matches: Vec<ForecastSnapshot> = snapshots
            .iter()
            .filter(|s| s.target_date == filter.target_date)
            .filter(|s| {
                filter
                    .generated_before
                    .map(|before| s.generated_at < before)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn insert_snapshot(
        &self,
        snapshot: NewForecastSnapshot,
    ) -> StoreResult<ForecastSnapshot> {
        let stored = ForecastSnapshot {
            id: uuid::Uuid::new_v4().to_string(),
            target_date: snapshot.target_date,
            generated_at: snapshot.generated_at,
            available_bus_count: snapshot.available_bus_count,
            unavailable_bus_count: snapshot.unavailable_bus_count,
            high_risk_bus_count: snapshot.high_risk_bus_count,
            metadata: snapshot.metadata,
        };
        self.snapshots.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn delete_snapshots(&self, target_date: DateTime<Utc>) -> StoreResult<u64> {
        let mut snapshots = self.snapshots.lock().unwrap();
        let before = snapshots.len();
        snapshots.retain(|s| s.target_date != target_date);
        Ok((before - snapshots.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// FailingFleetStore
// ---------------------------------------------------------------------------

/// Fleet store whose every read fails. Used to exercise the engine's
/// fail-open handling of data-unavailable conditions.
#[derive(Debug, Default)]
pub struct FailingFleetStore;

impl FailingFleetStore {
    pub fn new() -> Self {
        Self
    }

    fn unavailable() -> StoreError {
        StoreError::Connection("injected fetch failure".to_string())
    }
}

#[async_trait]
impl FleetStore for FailingFleetStore {
    async fn list_buses(&self) -> StoreResult<Vec<Bus>> {
        Err(Self::unavailable())
    }

    async fn list_maintenance_events(
        &self,
        _filter: MaintenanceEventFilter,
    ) -> StoreResult<Vec<MaintenanceEvent>> {
        Err(Self::unavailable())
    }

    async fn list_incidents(&self, _filter: IncidentFilter) -> StoreResult<Vec<Incident>> {
        Err(Self::unavailable())
    }
}
