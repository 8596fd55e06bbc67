//! fleetpulse-store: record store layer for FleetPulse
//!
//! This crate owns all persistence for the fleet maintenance system:
//! buses, maintenance events, incidents, and forecast snapshots.
//!
//! ## Key components
//!
//! - `FleetStore` / `ForecastStore`: async, backend-agnostic storage traits
//! - `SurrealFleetStore`: SurrealDB implementation (in-memory, remote, or
//!   local surrealkv)
//! - `fakes`: in-memory implementations for testing

mod error;
pub mod fakes;
mod schema;
pub mod storage_traits;
mod surreal_store;

pub use error::StoreError;
pub use storage_traits::{
    Bus, BusId, BusStatus, FleetStore, ForecastSnapshot, ForecastStore, GarageId, Incident,
    IncidentFilter, MaintenanceEvent, MaintenanceEventFilter, MaintenanceStatus,
    NewForecastSnapshot, Severity, SnapshotFilter, StoreResult,
};
pub use surreal_store::{StoreConfig, SurrealFleetStore};
