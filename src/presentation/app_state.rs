// Application state for HTTP handlers
use crate::application::export_service::ExportService;
use crate::application::seed_source::SeedSource;
use crate::application::telemetry_store::TelemetryStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub store: TelemetryStore,
    pub export_service: ExportService,
    pub update_interval: Duration,
    pub seed_source: Arc<dyn SeedSource>,
}
