// Domain validation errors
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("metric range is inverted: min {min} > max {max}")]
    InvertedRange { min: f64, max: f64 },

    #[error("equipment carries both batteryLevel and fuelLevel")]
    ConflictingPowerSources,

    #[error("unknown telemetry topic: {0}")]
    UnknownTopic(String),
}
