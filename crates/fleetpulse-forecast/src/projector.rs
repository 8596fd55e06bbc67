//! Single-date availability projection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fleetpulse_store::{BusStatus, FleetStore, GarageId};

use crate::duration::{average_repair_hours, DEFAULT_REPAIR_HOURS};
use crate::metrics::collect_bus_metrics;
use crate::risk::{identify_high_risk, HighRiskBus};
use crate::time::hours_between;

/// An Available high-risk bus is projected unavailable at this many incidents.
pub const ESCALATION_INCIDENT_THRESHOLD: u32 = 5;
/// An Available high-risk bus is projected unavailable at this many open
/// Critical/High events.
pub const ESCALATION_MAINTENANCE_THRESHOLD: u32 = 3;

/// Projected availability split for one target date.
///
/// Serialized field names are the wire contract toward snapshot persistence
/// and the dashboard API; existing consumers key off them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub target_date: DateTime<Utc>,
    pub available_bus_count: u32,
    pub unavailable_bus_count: u32,
    pub high_risk_bus_count: u32,
    pub high_risk_buses: Vec<HighRiskBus>,
}

/// Project the available/unavailable split for `target_date`.
///
/// Each bus is evaluated independently:
/// - OutOfService buses count unavailable for every target date.
/// - Available buses count available unless they are high-risk AND meet an
///   escalation threshold (the risk-flagging bar is deliberately lower than
///   the unavailability bar).
/// - InMaintenance buses count available iff the garage's average repair
///   time fits before the target date. A past-dated target yields a
///   negative hours-until-target and therefore "unavailable".
///
/// Garage averages are computed once per distinct garage per call and
/// reused across that garage's buses; nothing is cached across calls.
pub async fn project_for_date(
    store: &dyn FleetStore,
    target_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ForecastResult {
    let metrics = collect_bus_metrics(store, now).await;
    let high_risk_buses = identify_high_risk(&metrics);

    let mut garage_hours: HashMap<GarageId, f64> = HashMap::new();
    for metric in &metrics {
        if !garage_hours.contains_key(&metric.garage_id) {
            let hours = average_repair_hours(store, &metric.garage_id, now).await;
            garage_hours.insert(metric.garage_id.clone(), hours);
        }
    }

    let mut available_count = 0_u32;
    let mut unavailable_count = 0_u32;
    let hours_until_target = hours_between(now, target_date);

    for metric in &metrics {
        match metric.status {
            BusStatus::OutOfService => {
                unavailable_count += 1;
            }
            BusStatus::Available => {
                let is_high_risk = high_risk_buses.iter().any(|hr| hr.bus_id == metric.bus_id);
                if is_high_risk
                    && (metric.incidents_last_30_days >= ESCALATION_INCIDENT_THRESHOLD
                        || metric.open_critical_high_events >= ESCALATION_MAINTENANCE_THRESHOLD)
                {
                    unavailable_count += 1;
                } else {
                    available_count += 1;
                }
            }
            BusStatus::InMaintenance => {
                let avg_hours = garage_hours
                    .get(&metric.garage_id)
                    .copied()
                    .unwrap_or(DEFAULT_REPAIR_HOURS);
                if hours_until_target >= avg_hours {
                    available_count += 1;
                } else {
                    unavailable_count += 1;
                }
            }
        }
    }

    debug!(
        target_date = %target_date,
        available = available_count,
        unavailable = unavailable_count,
        high_risk = high_risk_buses.len(),
        "projected availability"
    );

    ForecastResult {
        target_date,
        available_bus_count: available_count,
        unavailable_bus_count: unavailable_count,
        high_risk_bus_count: high_risk_buses.len() as u32,
        high_risk_buses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let result = ForecastResult {
            target_date: Utc::now(),
            available_bus_count: 3,
            unavailable_bus_count: 1,
            high_risk_bus_count: 0,
            high_risk_buses: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("targetDate").is_some());
        assert!(json.get("availableBusCount").is_some());
        assert!(json.get("unavailableBusCount").is_some());
        assert!(json.get("highRiskBusCount").is_some());
        assert!(json.get("highRiskBuses").is_some());
    }
}
