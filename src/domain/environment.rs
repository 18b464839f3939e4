// Environment metric domain model
use super::bounded::BoundedQueue;
use super::error::DomainError;
use serde::{Deserialize, Serialize};

pub const HISTORY_CAPACITY: usize = 24;

pub type MetricHistory = BoundedQueue<f64, HISTORY_CAPACITY>;

/// A single environment reading with its recent history.
///
/// `current` always lies inside `range`; this holds for seeds too, since
/// deserialization clamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMetric")]
pub struct MetricRecord {
    pub current: f64,
    pub history: MetricHistory,
    pub unit: String,
    pub range: (f64, f64),
}

#[derive(Deserialize)]
struct RawMetric {
    current: f64,
    #[serde(default)]
    history: MetricHistory,
    #[serde(default)]
    unit: String,
    range: (f64, f64),
}

impl TryFrom<RawMetric> for MetricRecord {
    type Error = DomainError;

    fn try_from(raw: RawMetric) -> Result<Self, Self::Error> {
        let (min, max) = raw.range;
        if min > max {
            return Err(DomainError::InvertedRange { min, max });
        }
        Ok(Self {
            current: raw.current.clamp(min, max),
            history: raw.history,
            unit: raw.unit,
            range: raw.range,
        })
    }
}

impl MetricRecord {
    pub fn new(current: f64, unit: &str, range: (f64, f64)) -> Result<Self, DomainError> {
        RawMetric {
            current,
            history: MetricHistory::new(),
            unit: unit.to_string(),
            range,
        }
        .try_into()
    }

    pub fn min(&self) -> f64 {
        self.range.0
    }

    pub fn max(&self) -> f64 {
        self.range.1
    }

    pub fn span(&self) -> f64 {
        self.range.1 - self.range.0
    }

    /// Clamps `value` into range, rounds it to two decimals and records it.
    pub fn record(&mut self, value: f64) {
        let (min, max) = self.range;
        let rounded = (value.clamp(min, max) * 100.0).round() / 100.0;
        self.current = rounded.clamp(min, max);
        self.history.push(self.current);
    }
}
