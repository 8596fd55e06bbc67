//! Threshold-based risk classification over per-bus metrics.

use serde::{Deserialize, Serialize};

use fleetpulse_store::BusId;

use crate::metrics::BusMetrics;

/// A bus fires the incident-volume rule at this many incidents in the window.
pub const HIGH_RISK_INCIDENT_THRESHOLD: u32 = 3;
/// A bus fires the maintenance-backlog rule at this many open Critical/High events.
pub const HIGH_RISK_MAINTENANCE_THRESHOLD: u32 = 2;

/// A bus flagged as likely to need attention.
///
/// Serialized field names (`busId`, `fleetNumber`, `reason`) are part of the
/// snapshot metadata contract and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskBus {
    pub bus_id: BusId,
    pub fleet_number: String,
    pub reason: String,
}

/// Apply both threshold rules to every metrics record.
///
/// A bus is high-risk iff at least one rule fires; reasons are joined with
/// "; " in rule order (incident volume first). Buses with no firing rule
/// are omitted entirely.
pub fn identify_high_risk(metrics: &[BusMetrics]) -> Vec<HighRiskBus> {
    let mut high_risk = Vec::new();

    for metric in metrics {
        let mut reasons = Vec::new();

        if metric.incidents_last_30_days >= HIGH_RISK_INCIDENT_THRESHOLD {
            reasons.push(format!(
                "{} incidents in last 30 days",
                metric.incidents_last_30_days
            ));
        }

        if metric.open_critical_high_events >= HIGH_RISK_MAINTENANCE_THRESHOLD {
            reasons.push(format!(
                "{} open critical/high maintenance events",
                metric.open_critical_high_events
            ));
        }

        if !reasons.is_empty() {
            high_risk.push(HighRiskBus {
                bus_id: metric.bus_id.clone(),
                fleet_number: metric.fleet_number.clone(),
                reason: reasons.join("; "),
            });
        }
    }

    high_risk
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetpulse_store::{BusStatus, GarageId};

    fn metrics(incidents: u32, open_critical_high: u32) -> BusMetrics {
        BusMetrics {
            bus_id: BusId::new(),
            fleet_number: "BUS-001".to_string(),
            status: BusStatus::Available,
            garage_id: GarageId::new(),
            maintenance_events_last_30_days: 0,
            incidents_last_30_days: incidents,
            open_critical_high_events: open_critical_high,
        }
    }

    #[test]
    fn test_incident_rule_boundary() {
        assert!(identify_high_risk(&[metrics(2, 0)]).is_empty());

        let flagged = identify_high_risk(&[metrics(3, 0)]);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].reason, "3 incidents in last 30 days");
    }

    #[test]
    fn test_backlog_rule_boundary() {
        assert!(identify_high_risk(&[metrics(0, 1)]).is_empty());

        let flagged = identify_high_risk(&[metrics(0, 2)]);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].reason, "2 open critical/high maintenance events");
    }

    #[test]
    fn test_both_rules_join_in_order() {
        let flagged = identify_high_risk(&[metrics(4, 3)]);
        assert_eq!(flagged.len(), 1);
        assert_eq!(
            flagged[0].reason,
            "4 incidents in last 30 days; 3 open critical/high maintenance events"
        );
    }

    #[test]
    fn test_clean_buses_are_omitted() {
        let flagged = identify_high_risk(&[metrics(0, 0), metrics(3, 0), metrics(1, 1)]);
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn test_wire_field_names() {
        let flagged = identify_high_risk(&[metrics(3, 0)]);
        let json = serde_json::to_value(&flagged[0]).unwrap();
        assert!(json.get("busId").is_some());
        assert!(json.get("fleetNumber").is_some());
        assert!(json.get("reason").is_some());
    }
}
