//! SurrealDB-backed implementation of `FleetStore` and `ForecastStore`
//!
//! Uses the `schema` row types for persistence, converting to/from
//! `storage_traits` types at the boundary. Supports in-memory (`mem://`),
//! env-configured remote, and local surrealkv connections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::sql::Datetime as SurrealDatetime;
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::schema::{BusRow, ForecastSnapshotRow, IncidentRow, MaintenanceEventRow};
use crate::storage_traits::{
    Bus, FleetStore, ForecastSnapshot, ForecastStore, Incident, IncidentFilter, MaintenanceEvent,
    MaintenanceEventFilter, NewForecastSnapshot, SnapshotFilter, StoreResult,
};

/// Configuration for a remote SurrealDB connection
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Endpoint URL (e.g. "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    /// Database username
    pub username: String,
    /// Database password
    pub password: String,
    /// Namespace (default: "fleetpulse")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl StoreConfig {
    /// Create from environment variables.
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "fleetpulse")
    /// - SURREALDB_DATABASE (optional, default: "main")
    /// - SURREALDB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("SURREALDB_ENDPOINT").map_err(|_| "SURREALDB_ENDPOINT not set")?;
        let username =
            std::env::var("SURREALDB_USERNAME").map_err(|_| "SURREALDB_USERNAME not set")?;
        let password =
            std::env::var("SURREALDB_PASSWORD").map_err(|_| "SURREALDB_PASSWORD not set")?;
        let namespace =
            std::env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| "fleetpulse".to_string());
        let database = std::env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "main".to_string());
        let is_root = std::env::var("SURREALDB_ROOT")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

/// SurrealDB-backed fleet and forecast store.
#[derive(Clone)]
pub struct SurrealFleetStore {
    db: Surreal<Any>,
}

impl SurrealFleetStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `fleetpulse/main`, and initializes the
    /// schema.
    #[instrument(skip_all)]
    pub async fn in_memory() -> StoreResult<Self> {
        let db = surrealdb::engine::any::connect("mem://")
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        db.use_ns("fleetpulse")
            .use_db("main")
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = SurrealFleetStore { db };
        store.init_schema().await?;

        info!("SurrealFleetStore connected (in-memory)");
        Ok(store)
    }

    /// Connect to a remote endpoint described by a [`StoreConfig`].
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace))]
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StoreError::Connection(format!("Root auth failed: {e}")))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StoreError::Connection(format!("DB auth failed: {e}")))?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = SurrealFleetStore { db };
        store.init_schema().await?;

        info!("SurrealFleetStore connected (remote)");
        Ok(store)
    }

    /// Connect using environment variables.
    ///
    /// If SURREALDB_ENDPOINT is set, connects to that endpoint.
    /// If SURREALDB_URL is set, connects to that URL without auth.
    /// Otherwise falls back to local persistence in `.fleetpulse/db`.
    #[instrument(skip_all)]
    pub async fn from_env() -> StoreResult<Self> {
        if let Ok(config) = StoreConfig::from_env() {
            return Self::connect(config).await;
        }

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            let db = surrealdb::engine::any::connect(&url)
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            db.use_ns("fleetpulse")
                .use_db("main")
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            let store = SurrealFleetStore { db };
            store.init_schema().await?;
            info!("SurrealFleetStore connected ({})", url);
            return Ok(store);
        }

        let path = ".fleetpulse/db";
        std::fs::create_dir_all(path).map_err(|e| {
            StoreError::Connection(format!("Failed to create database directory {path}: {e}"))
        })?;
        let url = format!("surrealkv://{path}");
        info!(
            "No remote config or SURREALDB_URL found, using local persistence: {}",
            url
        );

        let db = surrealdb::engine::any::connect(&url)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to {url}: {e}")))?;

        db.use_ns("fleetpulse")
            .use_db("main")
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = SurrealFleetStore { db };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize the database schema
    async fn init_schema(&self) -> StoreResult<()> {
        debug!("Initializing FleetPulse schema");

        let schema = r#"
            -- Fleet roster
            DEFINE TABLE buses SCHEMAFULL;
            DEFINE FIELD bus_id ON buses TYPE string;
            DEFINE FIELD fleet_number ON buses TYPE string;
            DEFINE FIELD garage_id ON buses TYPE string;
            DEFINE FIELD status ON buses TYPE string;
            DEFINE FIELD mileage ON buses TYPE option<int>;
            DEFINE INDEX idx_bus_id ON buses FIELDS bus_id UNIQUE;
            DEFINE INDEX idx_bus_fleet_number ON buses FIELDS fleet_number UNIQUE;

            -- Maintenance lifecycle records
            DEFINE TABLE maintenance_events SCHEMAFULL;
            DEFINE FIELD event_id ON maintenance_events TYPE string;
            DEFINE FIELD bus_id ON maintenance_events TYPE string;
            DEFINE FIELD garage_id ON maintenance_events TYPE string;
            DEFINE FIELD severity ON maintenance_events TYPE string;
            DEFINE FIELD status ON maintenance_events TYPE string;
            DEFINE FIELD description ON maintenance_events TYPE string;
            DEFINE FIELD started_at ON maintenance_events TYPE datetime;
            DEFINE FIELD completed_at ON maintenance_events TYPE option<datetime>;
            DEFINE INDEX idx_event_id ON maintenance_events FIELDS event_id UNIQUE;
            DEFINE INDEX idx_event_bus ON maintenance_events FIELDS bus_id;
            DEFINE INDEX idx_event_garage_status ON maintenance_events FIELDS garage_id, status;

            -- Reported incidents (append-only)
            DEFINE TABLE incidents SCHEMAFULL;
            DEFINE FIELD incident_id ON incidents TYPE string;
            DEFINE FIELD bus_id ON incidents TYPE string;
            DEFINE FIELD garage_id ON incidents TYPE string;
            DEFINE FIELD severity ON incidents TYPE string;
            DEFINE FIELD description ON incidents TYPE string;
            DEFINE FIELD reported_at ON incidents TYPE datetime;
            DEFINE INDEX idx_incident_id ON incidents FIELDS incident_id UNIQUE;
            DEFINE INDEX idx_incident_bus ON incidents FIELDS bus_id;

            -- Forecast snapshots (regenerated over time, newest authoritative)
            DEFINE TABLE forecast_snapshots SCHEMAFULL;
            DEFINE FIELD snapshot_id ON forecast_snapshots TYPE string;
            DEFINE FIELD target_date ON forecast_snapshots TYPE datetime;
            DEFINE FIELD generated_at ON forecast_snapshots TYPE datetime;
            DEFINE FIELD available_bus_count ON forecast_snapshots TYPE int;
            DEFINE FIELD unavailable_bus_count ON forecast_snapshots TYPE int;
            DEFINE FIELD high_risk_bus_count ON forecast_snapshots TYPE int;
            DEFINE FIELD metadata ON forecast_snapshots FLEXIBLE TYPE object;
            DEFINE INDEX idx_snapshot_id ON forecast_snapshots FIELDS snapshot_id UNIQUE;
            DEFINE INDEX idx_snapshot_target ON forecast_snapshots FIELDS target_date, generated_at;
        "#;

        self.db
            .query(schema)
            .await
            .map_err(|e| StoreError::SchemaSetup(e.to_string()))?;

        debug!("Schema initialized successfully");
        Ok(())
    }

    // ========== Fleet record writes (owned by external workflows) ==========

    /// Save a bus record
    #[instrument(skip(self, bus), fields(fleet_number = %bus.fleet_number))]
    pub async fn save_bus(&self, bus: Bus) -> StoreResult<()> {
        debug!("Saving bus");

        let row = BusRow::from(bus);
        let _created: Option<BusRow> = self
            .db
            .create("buses")
            .content(row)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    /// Save a maintenance event record
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn save_maintenance_event(&self, event: MaintenanceEvent) -> StoreResult<()> {
        debug!("Saving maintenance event");

        let row = MaintenanceEventRow::from(event);
        let _created: Option<MaintenanceEventRow> = self
            .db
            .create("maintenance_events")
            .content(row)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    /// Save an incident record
    #[instrument(skip(self, incident), fields(incident_id = %incident.id))]
    pub async fn save_incident(&self, incident: Incident) -> StoreResult<()> {
        debug!("Saving incident");

        let row = IncidentRow::from(incident);
        let _created: Option<IncidentRow> = self
            .db
            .create("incidents")
            .content(row)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl FleetStore for SurrealFleetStore {
    async fn list_buses(&self) -> StoreResult<Vec<Bus>> {
        let mut res = self
            .db
            .query("SELECT * FROM buses ORDER BY fleet_number")
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let rows: Vec<BusRow> = res.take(0).map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.into_iter().map(Bus::from).collect())
    }

    async fn list_maintenance_events(
        &self,
        filter: MaintenanceEventFilter,
    ) -> StoreResult<Vec<MaintenanceEvent>> {
        let mut conditions = Vec::new();
        if filter.bus_id.is_some() {
            conditions.push("bus_id = $bus_id");
        }
        if filter.garage_id.is_some() {
            conditions.push("garage_id = $garage_id");
        }
        if filter.started_after.is_some() {
            conditions.push("started_at >= $started_after");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }

        let sql = if conditions.is_empty() {
            "SELECT * FROM maintenance_events ORDER BY started_at DESC".to_string()
        } else {
            format!(
                "SELECT * FROM maintenance_events WHERE {} ORDER BY started_at DESC",
                conditions.join(" AND ")
            )
        };

        let mut query = self.db.query(sql);
        if let Some(bus_id) = filter.bus_id {
            query = query.bind(("bus_id", bus_id.0));
        }
        if let Some(garage_id) = filter.garage_id {
            query = query.bind(("garage_id", garage_id.0));
        }
        if let Some(started_after) = filter.started_after {
            query = query.bind(("started_after", SurrealDatetime::from(started_after)));
        }
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }

        let mut res = query
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let rows: Vec<MaintenanceEventRow> =
            res.take(0).map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.into_iter().map(MaintenanceEvent::from).collect())
    }

    async fn list_incidents(&self, filter: IncidentFilter) -> StoreResult<Vec<Incident>> {
        let mut conditions = Vec::new();
        if filter.bus_id.is_some() {
            conditions.push("bus_id = $bus_id");
        }
        if filter.reported_after.is_some() {
            conditions.push("reported_at >= $reported_after");
        }

        let sql = if conditions.is_empty() {
            "SELECT * FROM incidents ORDER BY reported_at DESC".to_string()
        } else {
            format!(
                "SELECT * FROM incidents WHERE {} ORDER BY reported_at DESC",
                conditions.join(" AND ")
            )
        };

        let mut query = self.db.query(sql);
        if let Some(bus_id) = filter.bus_id {
            query = query.bind(("bus_id", bus_id.0));
        }
        if let Some(reported_after) = filter.reported_after {
            query = query.bind(("reported_after", SurrealDatetime::from(reported_after)));
        }

        let mut res = query
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let rows: Vec<IncidentRow> = res.take(0).map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.into_iter().map(Incident::from).collect())
    }
}

#[async_trait]
impl ForecastStore for SurrealFleetStore {
    async fn list_snapshots(
        &self,
        filter: SnapshotFilter,
        limit: usize,
    ) -> StoreResult<Vec<ForecastSnapshot>> {
        let sql = if filter.generated_before.is_some() {
            format!(
                "SELECT * FROM forecast_snapshots \
                 WHERE target_date = $target_date AND generated_at < $generated_before \
                 ORDER BY generated_at DESC LIMIT {limit}"
            )
        } else {
            format!(
                "SELECT * FROM forecast_snapshots WHERE target_date = $target_date \
                 ORDER BY generated_at DESC LIMIT {limit}"
            )
        };

        let mut query = self
            .db
            .query(sql)
            .bind(("target_date", SurrealDatetime::from(filter.target_date)));
        if let Some(before) = filter.generated_before {
            query = query.bind(("generated_before", SurrealDatetime::from(before)));
        }

        let mut res = query
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let rows: Vec<ForecastSnapshotRow> =
            res.take(0).map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.into_iter().map(ForecastSnapshot::from).collect())
    }

    async fn insert_snapshot(
        &self,
        snapshot: NewForecastSnapshot,
    ) -> StoreResult<ForecastSnapshot> {
        let row = ForecastSnapshotRow::from_new(snapshot);

        debug!(snapshot_id = %row.snapshot_id, "inserting forecast snapshot");

        let created: Option<ForecastSnapshotRow> = self
            .db
            .create("forecast_snapshots")
            .content(row)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        created
            .map(ForecastSnapshot::from)
            .ok_or_else(|| StoreError::Query("failed to create forecast snapshot".to_string()))
    }

    async fn delete_snapshots(&self, target_date: DateTime<Utc>) -> StoreResult<u64> {
        let mut res = self
            .db
            .query("DELETE FROM forecast_snapshots WHERE target_date = $target_date RETURN BEFORE")
            .bind(("target_date", SurrealDatetime::from(target_date)))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let deleted: Vec<ForecastSnapshotRow> =
            res.take(0).map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(deleted.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;

    use super::*;
    use crate::storage_traits::{BusId, BusStatus, GarageId, MaintenanceStatus, Severity};

    fn bus(fleet_number: &str, garage: &GarageId, status: BusStatus) -> Bus {
        Bus {
            id: BusId::new(),
            fleet_number: fleet_number.to_string(),
            garage_id: garage.clone(),
            status,
            mileage: Some(120_000),
        }
    }

    #[tokio::test]
    async fn test_connection_and_schema_creation() {
        let store = SurrealFleetStore::in_memory().await;
        assert!(store.is_ok(), "Failed to connect: {:?}", store.err());
    }

    #[tokio::test]
    async fn test_bus_round_trip() {
        let store = SurrealFleetStore::in_memory().await.unwrap();
        let garage = GarageId::new();

        store
            .save_bus(bus("BUS-001", &garage, BusStatus::Available))
            .await
            .unwrap();
        store
            .save_bus(bus("BUS-002", &garage, BusStatus::InMaintenance))
            .await
            .unwrap();

        let buses = store.list_buses().await.unwrap();
        assert_eq!(buses.len(), 2);
        assert_eq!(buses[0].fleet_number, "BUS-001");
        assert_eq!(buses[1].status, BusStatus::InMaintenance);
    }

    #[tokio::test]
    async fn test_maintenance_event_filters() {
        let store = SurrealFleetStore::in_memory().await.unwrap();
        let garage_a = GarageId::new();
        let garage_b = GarageId::new();
        let bus_id = BusId::new();
        let now = Utc::now();

        let event = |garage: &GarageId, status: MaintenanceStatus, days_ago: i64| {
            MaintenanceEvent {
                id: uuid::Uuid::new_v4().to_string(),
                bus_id: bus_id.clone(),
                garage_id: garage.clone(),
                severity: Severity::High,
                status,
                description: "brake overhaul".to_string(),
                started_at: now - Duration::days(days_ago),
                completed_at: matches!(status, MaintenanceStatus::Completed)
                    .then(|| now - Duration::days(days_ago) + Duration::hours(6)),
            }
        };

        store
            .save_maintenance_event(event(&garage_a, MaintenanceStatus::Completed, 5))
            .await
            .unwrap();
        store
            .save_maintenance_event(event(&garage_a, MaintenanceStatus::InProgress, 2))
            .await
            .unwrap();
        store
            .save_maintenance_event(event(&garage_b, MaintenanceStatus::Completed, 40))
            .await
            .unwrap();

        let completed_in_a = store
            .list_maintenance_events(MaintenanceEventFilter {
                garage_id: Some(garage_a.clone()),
                status: Some(MaintenanceStatus::Completed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(completed_in_a.len(), 1);
        assert!(completed_in_a[0].completed_at.is_some());

        let recent = store
            .list_maintenance_events(MaintenanceEventFilter {
                started_after: Some(now - Duration::days(30)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[tokio::test]
    async fn test_incident_filters() {
        let store = SurrealFleetStore::in_memory().await.unwrap();
        let garage = GarageId::new();
        let bus_a = BusId::new();
        let bus_b = BusId::new();
        let now = Utc::now();

        for (bus_id, days_ago) in [(&bus_a, 3_i64), (&bus_a, 45), (&bus_b, 1)] {
            store
                .save_incident(Incident {
                    id: uuid::Uuid::new_v4().to_string(),
                    bus_id: bus_id.clone(),
                    garage_id: garage.clone(),
                    severity: Severity::Medium,
                    description: "door jam".to_string(),
                    reported_at: now - Duration::days(days_ago),
                })
                .await
                .unwrap();
        }

        let recent_for_a = store
            .list_incidents(IncidentFilter {
                bus_id: Some(bus_a.clone()),
                reported_after: Some(now - Duration::days(30)),
            })
            .await
            .unwrap();
        assert_eq!(recent_for_a.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_ordering_and_delete() {
        let store = SurrealFleetStore::in_memory().await.unwrap();
        let target = Utc::now() + Duration::days(1);

        for (available, minutes_ago) in [(50_u32, 60_i64), (44, 0)] {
            store
                .insert_snapshot(NewForecastSnapshot {
                    target_date: target,
                    generated_at: Utc::now() - Duration::minutes(minutes_ago),
                    available_bus_count: available,
                    unavailable_bus_count: 10,
                    high_risk_bus_count: 2,
                    metadata: json!({ "highRiskBuses": [] }),
                })
                .await
                .unwrap();
        }

        let newest_first = store
            .list_snapshots(
                SnapshotFilter {
                    target_date: target,
                    generated_before: None,
                },
                10,
            )
            .await
            .unwrap();
        assert_eq!(newest_first.len(), 2);
        assert_eq!(newest_first[0].available_bus_count, 44);
        assert_eq!(newest_first[1].available_bus_count, 50);

        let older = store
            .list_snapshots(
                SnapshotFilter {
                    target_date: target,
                    generated_before: Some(newest_first[0].generated_at),
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(older.len(), 1);
        assert_eq!(older[0].available_bus_count, 50);

        let deleted = store.delete_snapshots(target).await.unwrap();
        assert_eq!(deleted, 2);
        let remaining = store
            .list_snapshots(
                SnapshotFilter {
                    target_date: target,
                    generated_before: None,
                },
                10,
            )
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
