//! Schema definitions for FleetPulse SurrealDB tables
//!
//! Tables:
//! - buses: Fleet roster with current operational status
//! - maintenance_events: Repair/inspection lifecycle records
//! - incidents: Reported incidents (append-only)
//! - forecast_snapshots: Persisted projection results per target date

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_traits::{
    Bus, BusId, BusStatus, ForecastSnapshot, GarageId, Incident, MaintenanceEvent,
    MaintenanceStatus, NewForecastSnapshot, Severity,
};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Module for serializing optional chrono DateTime to SurrealDB datetime format
mod surreal_datetime_opt {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => {
                let sd = SurrealDatetime::from(*d);
                serde::Serialize::serialize(&Some(sd), serializer)
            }
            None => serde::Serialize::serialize(&None::<SurrealDatetime>, serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = Option::<SurrealDatetime>::deserialize(deserializer)?;
        Ok(sd.map(DateTime::from))
    }
}

/// DB row for the `buses` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRow {
    pub bus_id: String,
    pub fleet_number: String,
    pub garage_id: String,
    pub status: BusStatus,
    pub mileage: Option<i64>,
}

impl From<Bus> for BusRow {
    fn from(bus: Bus) -> Self {
        BusRow {
            bus_id: bus.id.0,
            fleet_number: bus.fleet_number,
            garage_id: bus.garage_id.0,
            status: bus.status,
            mileage: bus.mileage,
        }
    }
}

impl From<BusRow> for Bus {
    fn from(row: BusRow) -> Self {
        Bus {
            id: BusId(row.bus_id),
            fleet_number: row.fleet_number,
            garage_id: GarageId(row.garage_id),
            status: row.status,
            mileage: row.mileage,
        }
    }
}

/// DB row for the `maintenance_events` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceEventRow {
    pub event_id: String,
    pub bus_id: String,
    pub garage_id: String,
    pub severity: Severity,
    pub status: MaintenanceStatus,
    pub description: String,
    #[serde(with = "surreal_datetime")]
    pub started_at: DateTime<Utc>,
    #[serde(default, with = "surreal_datetime_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<MaintenanceEvent> for MaintenanceEventRow {
    fn from(event: MaintenanceEvent) -> Self {
        MaintenanceEventRow {
            event_id: event.id,
            bus_id: event.bus_id.0,
            garage_id: event.garage_id.0,
            severity: event.severity,
            status: event.status,
            description: event.description,
            started_at: event.started_at,
            completed_at: event.completed_at,
        }
    }
}

impl From<MaintenanceEventRow> for MaintenanceEvent {
    fn from(row: MaintenanceEventRow) -> Self {
        MaintenanceEvent {
            id: row.event_id,
            bus_id: BusId(row.bus_id),
            garage_id: GarageId(row.garage_id),
            severity: row.severity,
            status: row.status,
            description: row.description,
            started_at: row.started_at,
            completed_at: row.completed_at,
        }
    }
}

/// DB row for the `incidents` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRow {
    pub incident_id: String,
    pub bus_id: String,
    pub garage_id: String,
    pub severity: Severity,
    pub description: String,
    #[serde(with = "surreal_datetime")]
    pub reported_at: DateTime<Utc>,
}

impl From<Incident> for IncidentRow {
    fn from(incident: Incident) -> Self {
        IncidentRow {
            incident_id: incident.id,
            bus_id: incident.bus_id.0,
            garage_id: incident.garage_id.0,
            severity: incident.severity,
            description: incident.description,
            reported_at: incident.reported_at,
        }
    }
}

impl From<IncidentRow> for Incident {
    fn from(row: IncidentRow) -> Self {
        Incident {
            id: row.incident_id,
            bus_id: BusId(row.bus_id),
            garage_id: GarageId(row.garage_id),
            severity: row.severity,
            description: row.description,
            reported_at: row.reported_at,
        }
    }
}

/// DB row for the `forecast_snapshots` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSnapshotRow {
    pub snapshot_id: String,
    #[serde(with = "surreal_datetime")]
    pub target_date: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub generated_at: DateTime<Utc>,
    pub available_bus_count: u32,
    pub unavailable_bus_count: u32,
    pub high_risk_bus_count: u32,
    pub metadata: serde_json::Value,
}

impl ForecastSnapshotRow {
    /// Build a row for insertion, assigning a fresh snapshot id.
    pub fn from_new(snapshot: NewForecastSnapshot) -> Self {
        ForecastSnapshotRow {
            snapshot_id: uuid::Uuid::new_v4().to_string(),
            target_date: snapshot.target_date,
            generated_at: snapshot.generated_at,
            available_bus_count: snapshot.available_bus_count,
            unavailable_bus_count: snapshot.unavailable_bus_count,
            high_risk_bus_count: snapshot.high_risk_bus_count,
            metadata: snapshot.metadata,
        }
    }
}

impl From<ForecastSnapshotRow> for ForecastSnapshot {
    fn from(row: ForecastSnapshotRow) -> Self {
        ForecastSnapshot {
            id: row.snapshot_id,
            target_date: row.target_date,
            generated_at: row.generated_at,
            available_bus_count: row.available_bus_count,
            unavailable_bus_count: row.unavailable_bus_count,
            high_risk_bus_count: row.high_risk_bus_count,
            metadata: row.metadata,
        }
    }
}
