// Alert domain model
use super::bounded::BoundedQueue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ALERTS_PER_LEVEL: usize = 10;

pub type AlertList = BoundedQueue<Alert, ALERTS_PER_LEVEL>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Equipment,
    Weather,
    Battery,
    System,
}

impl AlertKind {
    pub const ALL: [AlertKind; 4] = [
        AlertKind::Equipment,
        AlertKind::Weather,
        AlertKind::Battery,
        AlertKind::System,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
}

/// Alerts bucketed by severity: high → critical, medium → warnings, low → info.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertData {
    #[serde(default)]
    pub critical: AlertList,
    #[serde(default)]
    pub warnings: AlertList,
    #[serde(default)]
    pub info: AlertList,
}

impl AlertData {
    /// Appends to the matching bucket, evicting that bucket's oldest alert when full.
    pub fn push(&mut self, alert: Alert) {
        let list = match alert.severity {
            Severity::High => &mut self.critical,
            Severity::Medium => &mut self.warnings,
            Severity::Low => &mut self.info,
        };
        list.push(alert);
    }

    pub fn last_id(&self) -> Option<i64> {
        [&self.critical, &self.warnings, &self.info]
            .into_iter()
            .flat_map(|list| list.iter())
            .map(|alert| alert.id)
            .max()
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.warnings.len() + self.info.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: i64, severity: Severity) -> Alert {
        Alert {
            id,
            kind: AlertKind::System,
            message: "communication signal weak".to_string(),
            timestamp: DateTime::from_timestamp_millis(id).unwrap(),
            severity,
        }
    }

    #[test]
    fn test_push_buckets_by_severity() {
        let mut alerts = AlertData::default();
        alerts.push(alert(1, Severity::High));
        alerts.push(alert(2, Severity::Medium));
        alerts.push(alert(3, Severity::Low));
        alerts.push(alert(4, Severity::Low));

        assert_eq!(alerts.critical.len(), 1);
        assert_eq!(alerts.warnings.len(), 1);
        assert_eq!(alerts.info.len(), 2);
        assert_eq!(alerts.last_id(), Some(4));
    }

    #[test]
    fn test_bucket_evicts_oldest() {
        let mut alerts = AlertData::default();
        for id in 0..15 {
            alerts.push(alert(id, Severity::High));
        }
        assert_eq!(alerts.critical.len(), ALERTS_PER_LEVEL);
        assert_eq!(alerts.critical.oldest().map(|a| a.id), Some(5));
        assert!(alerts.info.is_empty());
    }

    #[test]
    fn test_serializes_type_field() {
        let value = serde_json::to_value(alert(7, Severity::Medium)).unwrap();
        assert_eq!(value["type"], "system");
        assert_eq!(value["severity"], "medium");
    }
}
