//! Storage trait definitions for FleetPulse
//!
//! These traits define the read surface the forecasting engine depends on:
//! - `FleetStore`: buses, maintenance events, incidents (read-only)
//! - `ForecastStore`: forecast snapshot history (read + snapshot writes)
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module; the SurrealDB implementation lives in
//! `surreal_store`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Unique identifier for a bus
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusId(pub String);

impl BusId {
    /// Generate a new random BusId
    pub fn new() -> Self {
        BusId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for BusId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a garage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GarageId(pub String);

impl GarageId {
    /// Generate a new random GarageId
    pub fn new() -> Self {
        GarageId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for GarageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GarageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Fleet records
// ---------------------------------------------------------------------------

/// Operational status of a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusStatus {
    Available,
    InMaintenance,
    OutOfService,
}

/// Severity of a maintenance event or incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// Lifecycle status of a maintenance event.
///
/// Transitions: New -> InProgress -> Completed (terminal). `completed_at`
/// is set exactly once, by the maintenance-completion workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    New,
    InProgress,
    Completed,
}

/// A bus in the fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    /// Human-facing fleet label (e.g. "BUS-1042")
    pub fleet_number: String,
    /// Garage this bus is assigned to
    pub garage_id: GarageId,
    pub status: BusStatus,
    /// Odometer reading in kilometers, if recorded
    pub mileage: Option<i64>,
}

/// A maintenance event (repair, inspection, preventive work)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub id: String,
    pub bus_id: BusId,
    pub garage_id: GarageId,
    pub severity: Severity,
    pub status: MaintenanceStatus,
    pub description: String,
    pub started_at: DateTime<Utc>,
    /// Set exactly once when the event reaches Completed
    pub completed_at: Option<DateTime<Utc>>,
}

/// A reported incident (append-only from the engine's point of view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub bus_id: BusId,
    pub garage_id: GarageId,
    pub severity: Severity,
    pub description: String,
    pub reported_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Forecast snapshots
// ---------------------------------------------------------------------------

/// A persisted projection result for one target date.
///
/// Multiple snapshots may exist per target date as forecasts are
/// regenerated; the most recently generated one is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub id: String,
    pub target_date: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub available_bus_count: u32,
    pub unavailable_bus_count: u32,
    pub high_risk_bus_count: u32,
    /// Free-form payload; carries `{"highRiskBuses": [...]}` for consumers
    /// that key off the serialized high-risk list.
    pub metadata: serde_json::Value,
}

/// Snapshot contents prior to insertion (the store assigns the id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewForecastSnapshot {
    pub target_date: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub available_bus_count: u32,
    pub unavailable_bus_count: u32,
    pub high_risk_bus_count: u32,
    pub metadata: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Filter for maintenance event listings; all fields optional, ANDed.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceEventFilter {
    pub bus_id: Option<BusId>,
    pub garage_id: Option<GarageId>,
    /// Only events with `started_at >= started_after`
    pub started_after: Option<DateTime<Utc>>,
    pub status: Option<MaintenanceStatus>,
}

/// Filter for incident listings; all fields optional, ANDed.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub bus_id: Option<BusId>,
    /// Only incidents with `reported_at >= reported_after`
    pub reported_after: Option<DateTime<Utc>>,
}

/// Filter for snapshot listings.
#[derive(Debug, Clone)]
pub struct SnapshotFilter {
    pub target_date: DateTime<Utc>,
    /// Only snapshots with `generated_at < generated_before`
    pub generated_before: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// FleetStore — fleet record reads
// ---------------------------------------------------------------------------

/// Read access to fleet records.
///
/// The forecasting engine never mutates these records; all writes are owned
/// by the maintenance and incident-logging workflows.
#[async_trait]
pub trait FleetStore: Send + Sync {
    /// List every bus in the fleet.
    async fn list_buses(&self) -> StoreResult<Vec<Bus>>;

    /// List maintenance events matching the filter.
    async fn list_maintenance_events(
        &self,
        filter: MaintenanceEventFilter,
    ) -> StoreResult<Vec<MaintenanceEvent>>;

    /// List incidents matching the filter.
    async fn list_incidents(&self, filter: IncidentFilter) -> StoreResult<Vec<Incident>>;
}

// ---------------------------------------------------------------------------
// ForecastStore — snapshot history
// ---------------------------------------------------------------------------

/// Forecast snapshot persistence.
///
/// Guarantees:
/// - `list_snapshots` returns matches ordered by `generated_at` descending
///   (newest first), truncated to `limit`.
/// - `insert_snapshot` assigns a fresh id and never overwrites.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// List snapshots for a target date, newest first.
    async fn list_snapshots(
        &self,
        filter: SnapshotFilter,
        limit: usize,
    ) -> StoreResult<Vec<ForecastSnapshot>>;

    /// Persist a new snapshot, returning the stored record.
    async fn insert_snapshot(
        &self,
        snapshot: NewForecastSnapshot,
    ) -> StoreResult<ForecastSnapshot>;

    /// Delete all snapshots for a target date, returning how many were removed.
    async fn delete_snapshots(&self, target_date: DateTime<Utc>) -> StoreResult<u64>;
}
