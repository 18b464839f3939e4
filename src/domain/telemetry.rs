// Telemetry tree and topic domain models
use super::alert::AlertData;
use super::environment::MetricRecord;
use super::equipment::EquipmentRecord;
use super::error::DomainError;
use super::production::ProductionData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type EnvironmentData = BTreeMap<String, MetricRecord>;
pub type EquipmentData = BTreeMap<String, EquipmentRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkArea {
    pub center: [f64; 2],
    /// `[[min_lon, min_lat], [max_lon, max_lat]]`
    pub bounds: [[f64; 2]; 2],
}

impl WorkArea {
    pub fn clamp(&self, coordinates: [f64; 2]) -> [f64; 2] {
        let [[min_lon, min_lat], [max_lon, max_lat]] = self.bounds;
        [
            coordinates[0].clamp(min_lon.min(max_lon), min_lon.max(max_lon)),
            coordinates[1].clamp(min_lat.min(max_lat), min_lat.max(max_lat)),
        ]
    }

    pub fn contains(&self, coordinates: [f64; 2]) -> bool {
        self.clamp(coordinates) == coordinates
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_area: Option<WorkArea>,
}

/// The whole simulated state: one subtree per topic plus GPS and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryTree {
    #[serde(default)]
    pub environment_data: EnvironmentData,
    #[serde(default)]
    pub equipment_data: EquipmentData,
    #[serde(default)]
    pub production_data: ProductionData,
    #[serde(default)]
    pub alert_data: AlertData,
    #[serde(default)]
    pub gps_data: GpsData,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl TelemetryTree {
    pub fn topic(&self, topic: Topic) -> TopicUpdate {
        match topic {
            Topic::Environment => TopicUpdate::Environment(self.environment_data.clone()),
            Topic::Equipment => TopicUpdate::Equipment(self.equipment_data.clone()),
            Topic::Production => TopicUpdate::Production(self.production_data.clone()),
            Topic::Alerts => TopicUpdate::Alerts(self.alert_data.clone()),
        }
    }

    /// Pulls every machine position back inside the work area, if one is set.
    pub fn confine_to_work_area(&mut self) {
        let Some(area) = self.gps_data.work_area else {
            return;
        };
        for record in self.equipment_data.values_mut() {
            if let Some(coordinates) = record.coordinates.as_mut() {
                *coordinates = area.clamp(*coordinates);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Environment,
    Equipment,
    Production,
    Alerts,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Environment,
        Topic::Equipment,
        Topic::Production,
        Topic::Alerts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Environment => "environmentData",
            Topic::Equipment => "equipmentData",
            Topic::Production => "productionData",
            Topic::Alerts => "alertData",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = DomainError;

    /// Accepts both the tree key (`environmentData`) and the short name (`environment`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "environmentData" | "environment" => Ok(Topic::Environment),
            "equipmentData" | "equipment" => Ok(Topic::Equipment),
            "productionData" | "production" => Ok(Topic::Production),
            "alertData" | "alerts" => Ok(Topic::Alerts),
            other => Err(DomainError::UnknownTopic(other.to_string())),
        }
    }
}

/// Payload delivered to subscribers, tagged by topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TopicUpdate {
    Environment(EnvironmentData),
    Equipment(EquipmentData),
    Production(ProductionData),
    Alerts(AlertData),
}

impl TopicUpdate {
    pub fn topic(&self) -> Topic {
        match self {
            TopicUpdate::Environment(_) => Topic::Environment,
            TopicUpdate::Equipment(_) => Topic::Equipment,
            TopicUpdate::Production(_) => Topic::Production,
            TopicUpdate::Alerts(_) => Topic::Alerts,
        }
    }
}
