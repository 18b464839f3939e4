// Simulator - Random-walk evolution of the telemetry tree, one tick at a time
use crate::domain::alert::{Alert, AlertKind, Severity};
use crate::domain::equipment::{EFFICIENCY_RANGE, PowerSource};
use crate::domain::telemetry::{TelemetryTree, Topic};
use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

/// Fraction of a metric's range it may move per tick (±half of this).
const ENVIRONMENT_STEP_FRACTION: f64 = 0.05;
const EFFICIENCY_STEP: f64 = 4.0;
const BATTERY_DRAIN_MAX: f64 = 0.5;
const FUEL_DRAIN_MAX: f64 = 0.3;
const POSITION_STEP: f64 = 0.001;
const MAX_DAILY_GRASS_SQUARES: u32 = 4;

const HIGH_SEVERITY_CUTOFF: f64 = 0.2;
const MEDIUM_SEVERITY_CUTOFF: f64 = 0.6;

const ALERT_MESSAGES: [&str; 6] = [
    "Equipment temperature abnormal",
    "Wind speed exceeds safety threshold",
    "Low battery warning",
    "Communication signal weak",
    "Material stock running low",
    "Equipment efficiency dropped",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub alert_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alert_probability: 0.1,
        }
    }
}

/// What one tick changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub topics: Vec<Topic>,
    pub alert: Option<Alert>,
}

#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advances every subtree once and refreshes the timestamp.
    ///
    /// Environment, equipment and production are always reported as changed;
    /// alerts only when one was raised.
    pub fn advance<R: Rng>(
        &self,
        tree: &mut TelemetryTree,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> TickReport {
        let mut topics = vec![Topic::Environment, Topic::Equipment, Topic::Production];

        self.advance_environment(tree, rng);
        self.advance_equipment(tree, rng);
        self.advance_production(tree, rng, now);
        let alert = self.maybe_raise_alert(tree, rng, now);
        if alert.is_some() {
            topics.push(Topic::Alerts);
        }
        tree.timestamp = now;

        TickReport { topics, alert }
    }

    fn advance_environment<R: Rng>(&self, tree: &mut TelemetryTree, rng: &mut R) {
        for metric in tree.environment_data.values_mut() {
            let variation = metric.span() * ENVIRONMENT_STEP_FRACTION;
            let change = (rng.random::<f64>() - 0.5) * variation;
            metric.record(metric.current + change);
        }
    }

    fn advance_equipment<R: Rng>(&self, tree: &mut TelemetryTree, rng: &mut R) {
        let work_area = tree.gps_data.work_area;

        for equipment in tree.equipment_data.values_mut() {
            if let Some(efficiency) = equipment.efficiency.as_mut() {
                let next = *efficiency + (rng.random::<f64>() - 0.5) * EFFICIENCY_STEP;
                *efficiency = next.clamp(EFFICIENCY_RANGE.0, EFFICIENCY_RANGE.1).round();
            }

            if let Some(power) = equipment.power.as_mut() {
                let drain = match power {
                    PowerSource::Battery(_) => rng.random::<f64>() * BATTERY_DRAIN_MAX,
                    PowerSource::Fuel(_) => rng.random::<f64>() * FUEL_DRAIN_MAX,
                };
                power.drain(drain);
            }

            if let Some(coordinates) = equipment.coordinates.as_mut() {
                coordinates[0] += (rng.random::<f64>() - 0.5) * POSITION_STEP;
                coordinates[1] += (rng.random::<f64>() - 0.5) * POSITION_STEP;
                if let Some(area) = work_area {
                    *coordinates = area.clamp(*coordinates);
                }
            }

            equipment.refresh_status();
        }
    }

    fn advance_production<R: Rng>(
        &self,
        tree: &mut TelemetryTree,
        rng: &mut R,
        now: DateTime<Utc>,
    ) {
        let weekday = now.weekday().num_days_from_sunday() as usize;
        let increment = rng.random_range(0..=MAX_DAILY_GRASS_SQUARES);
        tree.production_data
            .daily_progress
            .advance_grass_squares(weekday, increment);
    }

    fn maybe_raise_alert<R: Rng>(
        &self,
        tree: &mut TelemetryTree,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        if rng.random::<f64>() >= self.config.alert_probability {
            return None;
        }

        let kind = AlertKind::ALL[rng.random_range(0..AlertKind::ALL.len())];
        let message = ALERT_MESSAGES[rng.random_range(0..ALERT_MESSAGES.len())];
        let severity = severity_from_draw(rng.random::<f64>());

        // Ids follow the clock but stay unique when two alerts share a millisecond.
        let id = match tree.alert_data.last_id() {
            Some(last) => now.timestamp_millis().max(last + 1),
            None => now.timestamp_millis(),
        };

        let alert = Alert {
            id,
            kind,
            message: message.to_string(),
            timestamp: now,
            severity,
        };
        tracing::debug!(id, ?severity, ?kind, "raised alert");
        tree.alert_data.push(alert.clone());
        Some(alert)
    }
}

/// 20% high, 40% medium, 40% low.
fn severity_from_draw(draw: f64) -> Severity {
    if draw < HIGH_SEVERITY_CUTOFF {
        Severity::High
    } else if draw < MEDIUM_SEVERITY_CUTOFF {
        Severity::Medium
    } else {
        Severity::Low
    }
}
