//! fleetpulse-forecast: deterministic bus availability forecasting
//!
//! Pipeline: raw fleet records -> per-bus metrics -> {risk classification,
//! repair-duration estimation} -> per-date availability projection ->
//! multi-day orchestration and day-over-day drop alerting.
//!
//! ## Design notes
//!
//! - Every public entry point takes an explicit `now: DateTime<Utc>`; the
//!   engine never reads the wall clock, so forecasts are reproducible.
//! - Read failures degrade to empty/default results (empty metrics, the
//!   24-hour repair fallback, no alert) rather than raising; a single fetch
//!   failure never blocks forecast generation.
//! - The two-tier thresholds (risk flagging vs. unavailability escalation)
//!   are intentional: visibility uses a lower bar than projected downtime.

pub mod duration;
pub mod engine;
mod error;
pub mod job;
pub mod metrics;
pub mod notify;
pub mod projector;
pub mod risk;
pub mod time;

pub use duration::{average_repair_hours, DEFAULT_REPAIR_HOURS};
pub use engine::{DropCheck, ForecastEngine, AVAILABILITY_DROP_THRESHOLD};
pub use error::ForecastError;
pub use job::{run_forecast_job, ForecastRunReport};
pub use metrics::{collect_bus_metrics, BusMetrics};
pub use notify::{LogNotifier, MemoryNotifier, NotificationKind, Notifier};
pub use projector::{
    project_for_date, ForecastResult, ESCALATION_INCIDENT_THRESHOLD,
    ESCALATION_MAINTENANCE_THRESHOLD,
};
pub use risk::{
    identify_high_risk, HighRiskBus, HIGH_RISK_INCIDENT_THRESHOLD,
    HIGH_RISK_MAINTENANCE_THRESHOLD,
};
pub use time::start_of_day;
