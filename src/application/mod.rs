// Application layer - Use cases over the telemetry domain
pub mod export_service;
pub mod seed_source;
pub mod simulator;
pub mod synthetic;
pub mod telemetry_store;
pub mod topic_feed;
