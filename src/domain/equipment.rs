// Equipment domain model
use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EFFICIENCY_RANGE: (f64, f64) = (70.0, 100.0);
pub const CRITICAL_POWER_THRESHOLD: f64 = 20.0;
pub const WARNING_POWER_THRESHOLD: f64 = 50.0;
const DEFAULT_POWER_LEVEL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Working,
    Warning,
    Critical,
}

impl EquipmentStatus {
    /// Three-tier threshold: below 20 is critical, below 50 is warning.
    pub fn from_power_level(level: f64) -> Self {
        if level < CRITICAL_POWER_THRESHOLD {
            EquipmentStatus::Critical
        } else if level < WARNING_POWER_THRESHOLD {
            EquipmentStatus::Warning
        } else {
            EquipmentStatus::Working
        }
    }
}

/// A machine runs on either a battery or a fuel tank, never both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerSource {
    Battery(f64),
    Fuel(f64),
}

impl PowerSource {
    pub fn level(&self) -> f64 {
        match self {
            PowerSource::Battery(level) | PowerSource::Fuel(level) => *level,
        }
    }

    /// Drains by `amount`, never below zero.
    pub fn drain(&mut self, amount: f64) {
        match self {
            PowerSource::Battery(level) | PowerSource::Fuel(level) => {
                *level = (*level - amount.max(0.0)).max(0.0);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEquipment", into = "RawEquipment")]
pub struct EquipmentRecord {
    pub efficiency: Option<f64>,
    pub power: Option<PowerSource>,
    pub coordinates: Option<[f64; 2]>,
    pub status: EquipmentStatus,
    /// Machine-specific readings (working hours, pressure, ...) kept as-is.
    pub details: BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEquipment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    battery_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fuel_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinates: Option<[f64; 2]>,
    #[serde(default = "default_status")]
    status: EquipmentStatus,
    #[serde(flatten)]
    details: BTreeMap<String, serde_json::Value>,
}

fn default_status() -> EquipmentStatus {
    EquipmentStatus::Working
}

impl TryFrom<RawEquipment> for EquipmentRecord {
    type Error = DomainError;

    fn try_from(raw: RawEquipment) -> Result<Self, Self::Error> {
        let power = match (raw.battery_level, raw.fuel_level) {
            (Some(_), Some(_)) => return Err(DomainError::ConflictingPowerSources),
            (Some(level), None) => Some(PowerSource::Battery(level.max(0.0))),
            (None, Some(level)) => Some(PowerSource::Fuel(level.max(0.0))),
            (None, None) => None,
        };
        // Status is always derived from power; the stored label is not trusted.
        let mut record = Self {
            efficiency: raw
                .efficiency
                .map(|e| e.clamp(EFFICIENCY_RANGE.0, EFFICIENCY_RANGE.1)),
            power,
            coordinates: raw.coordinates,
            status: raw.status,
            details: raw.details,
        };
        record.refresh_status();
        Ok(record)
    }
}

impl From<EquipmentRecord> for RawEquipment {
    fn from(record: EquipmentRecord) -> Self {
        let (battery_level, fuel_level) = match record.power {
            Some(PowerSource::Battery(level)) => (Some(level), None),
            Some(PowerSource::Fuel(level)) => (None, Some(level)),
            None => (None, None),
        };
        Self {
            efficiency: record.efficiency,
            battery_level,
            fuel_level,
            coordinates: record.coordinates,
            status: record.status,
            details: record.details,
        }
    }
}

impl EquipmentRecord {
    pub fn new(efficiency: f64, power: Option<PowerSource>, coordinates: [f64; 2]) -> Self {
        let mut record = Self {
            efficiency: Some(efficiency),
            power,
            coordinates: Some(coordinates),
            status: EquipmentStatus::Working,
            details: BTreeMap::new(),
        };
        record.refresh_status();
        record
    }

    pub fn with_detail(mut self, key: &str, value: f64) -> Self {
        self.details.insert(key.to_string(), serde_json::Value::from(value));
        self
    }

    pub fn power_level(&self) -> f64 {
        self.power.map(|p| p.level()).unwrap_or(DEFAULT_POWER_LEVEL)
    }

    pub fn refresh_status(&mut self) {
        self.status = EquipmentStatus::from_power_level(self.power_level());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(EquipmentStatus::from_power_level(15.0), EquipmentStatus::Critical);
        assert_eq!(EquipmentStatus::from_power_level(35.0), EquipmentStatus::Warning);
        assert_eq!(EquipmentStatus::from_power_level(80.0), EquipmentStatus::Working);
        assert_eq!(EquipmentStatus::from_power_level(20.0), EquipmentStatus::Warning);
        assert_eq!(EquipmentStatus::from_power_level(50.0), EquipmentStatus::Working);
        assert_eq!(EquipmentStatus::from_power_level(0.0), EquipmentStatus::Critical);
    }

    #[test]
    fn test_missing_power_defaults_to_working() {
        let record = EquipmentRecord::new(95.0, None, [108.1, 39.0]);
        assert_eq!(record.power_level(), 100.0);
        assert_eq!(record.status, EquipmentStatus::Working);
    }

    #[test]
    fn test_drain_floors_at_zero() {
        let mut power = PowerSource::Fuel(0.2);
        power.drain(0.3);
        assert_eq!(power, PowerSource::Fuel(0.0));
    }

    #[test]
    fn test_seed_shape_round_trips_details() {
        let json = r#"{
            "efficiency": 92, "batteryLevel": 85, "workingHours": 6.5,
            "status": "working", "coordinates": [108.2, 39.1]
        }"#;
        let record: EquipmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.power, Some(PowerSource::Battery(85.0)));
        assert_eq!(record.details.get("workingHours"), Some(&serde_json::json!(6.5)));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["batteryLevel"], serde_json::json!(85.0));
        assert!(value.get("fuelLevel").is_none());
        assert_eq!(value["workingHours"], serde_json::json!(6.5));
    }

    #[test]
    fn test_seed_status_and_efficiency_are_normalized() {
        let record: EquipmentRecord =
            serde_json::from_str(r#"{"efficiency": 150, "batteryLevel": 10, "status": "working"}"#)
                .unwrap();
        assert_eq!(record.status, EquipmentStatus::from_power_level(10.0));
        assert_eq!(record.status, EquipmentStatus::Critical);
        assert_eq!(record.efficiency, Some(100.0));

        let record: EquipmentRecord =
            serde_json::from_str(r#"{"efficiency": 12, "status": "warning"}"#).unwrap();
        assert_eq!(record.status, EquipmentStatus::Working);
        assert_eq!(record.efficiency, Some(70.0));
    }

    #[test]
    fn test_both_power_sources_rejected() {
        let json = r#"{"batteryLevel": 50, "fuelLevel": 40, "status": "working"}"#;
        let err = serde_json::from_str::<EquipmentRecord>(json).unwrap_err();
        assert!(err.to_string().contains("both batteryLevel and fuelLevel"));
    }
}
