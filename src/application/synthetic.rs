// Synthetic telemetry - Built-in seed used when no seed document can be loaded
use crate::domain::alert::AlertData;
use crate::domain::environment::{MetricHistory, MetricRecord};
use crate::domain::equipment::{EquipmentRecord, PowerSource};
use crate::domain::production::{DailyProgress, ProductionData};
use crate::domain::telemetry::{
    EnvironmentData, EquipmentData, GpsData, TelemetryTree, WorkArea,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeMap;

const SYNTHETIC_HISTORY_LEN: usize = 12;
const SYNTHETIC_HISTORY_SPREAD: f64 = 0.1;

pub fn synthesize_tree<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> TelemetryTree {
    TelemetryTree {
        environment_data: synthesize_environment(rng),
        equipment_data: synthesize_equipment(),
        production_data: synthesize_production(),
        alert_data: AlertData::default(),
        gps_data: GpsData {
            work_area: Some(WorkArea {
                center: [108.2, 39.1],
                bounds: [[108.0, 38.9], [108.4, 39.3]],
            }),
        },
        timestamp: now,
    }
}

fn synthesize_environment<R: Rng>(rng: &mut R) -> EnvironmentData {
    let metrics = [
        ("temperature", 28.5, "°C", (20.0, 45.0)),
        ("humidity", 45.2, "%", (30.0, 70.0)),
        ("windSpeed", 12.3, "km/h", (0.0, 25.0)),
        ("sandDensity", 1.85, "g/cm³", (1.5, 2.2)),
        ("visibility", 8.5, "km", (0.0, 15.0)),
    ];

    metrics
        .into_iter()
        .map(|(name, current, unit, range)| {
            let record = MetricRecord {
                current,
                history: synthesize_history(rng, current, range),
                unit: unit.to_string(),
                range,
            };
            (name.to_string(), record)
        })
        .collect()
}

/// Values scattered around `base` by up to ±5% of the range, clamped.
fn synthesize_history<R: Rng>(rng: &mut R, base: f64, range: (f64, f64)) -> MetricHistory {
    let (min, max) = range;
    let variation = (max - min) * SYNTHETIC_HISTORY_SPREAD;
    (0..SYNTHETIC_HISTORY_LEN)
        .map(|_| (base + (rng.random::<f64>() - 0.5) * variation).clamp(min, max))
        .collect::<Vec<_>>()
        .into()
}

fn synthesize_equipment() -> EquipmentData {
    let mut equipment = BTreeMap::new();

    equipment.insert(
        "grassLayingMachine".to_string(),
        EquipmentRecord::new(92.0, Some(PowerSource::Battery(85.0)), [108.2, 39.1])
            .with_detail("workingHours", 6.5)
            .with_detail("grassConsumption", 3.2)
            .with_detail("coverageArea", 1250.0),
    );
    equipment.insert(
        "transportVehicle".to_string(),
        EquipmentRecord::new(88.0, Some(PowerSource::Fuel(68.0)), [108.3, 39.2])
            .with_detail("loadCapacity", 75.0)
            .with_detail("distanceTraveled", 45.2),
    );
    equipment.insert(
        "gridMaker".to_string(),
        EquipmentRecord::new(95.0, None, [108.1, 39.0])
            .with_detail("precision", 98.0)
            .with_detail("speed", 3.2)
            .with_detail("gridCount", 450.0),
    );
    equipment.insert(
        "compactor".to_string(),
        EquipmentRecord::new(85.0, None, [108.4, 39.3])
            .with_detail("pressure", 150.0)
            .with_detail("temperature", 35.0)
            .with_detail("compactionRate", 88.0),
    );
    equipment.insert(
        "monitoringVehicle".to_string(),
        EquipmentRecord::new(98.0, None, [108.2, 39.1])
            .with_detail("signalStrength", 95.0)
            .with_detail("coverage", 95.0)
            .with_detail("dataTransmission", 1024.0),
    );
    equipment.insert(
        "waterTruck".to_string(),
        EquipmentRecord::new(90.0, None, [108.0, 38.9])
            .with_detail("waterLevel", 80.0)
            .with_detail("pressure", 75.0)
            .with_detail("sprayRate", 2.5),
    );

    equipment
}

fn synthesize_production() -> ProductionData {
    let quality_metrics = [
        ("sandFixingEffect", 95.0),
        ("gridUniformity", 88.0),
        ("materialUtilization", 92.0),
        ("durability", 87.0),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect();

    ProductionData {
        daily_progress: DailyProgress {
            grass_squares: vec![45, 52, 48, 65, 58, 72, 85],
            area: vec![450.0, 520.0, 480.0, 650.0, 580.0, 720.0, 850.0],
            efficiency: vec![78.0, 82.0, 75.0, 88.0, 85.0, 92.0, 95.0],
        },
        quality_metrics,
    }
}
