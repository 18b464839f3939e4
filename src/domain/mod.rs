// Domain layer - Telemetry models and their invariants
pub mod alert;
pub mod bounded;
pub mod environment;
pub mod equipment;
pub mod error;
pub mod production;
pub mod telemetry;
