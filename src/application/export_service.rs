// Export service - Use case for building the downloadable project document
use crate::application::telemetry_store::TelemetryStore;
use crate::domain::telemetry::TelemetryTree;
use crate::infrastructure::config::ProjectConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub planned_completion: String,
    /// Laid area against the planned area, in percent (capped at 100).
    pub current_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub timestamp: DateTime<Utc>,
    pub project: ProjectSummary,
    pub telemetry: TelemetryTree,
}

#[derive(Clone)]
pub struct ExportService {
    store: TelemetryStore,
    project: ProjectConfig,
}

impl ExportService {
    pub fn new(store: TelemetryStore, project: ProjectConfig) -> Self {
        Self { store, project }
    }

    pub fn build(&self, now: DateTime<Utc>) -> ExportDocument {
        let telemetry = self.store.get_all();
        let laid_area = telemetry.production_data.daily_progress.total_area();

        ExportDocument {
            timestamp: now,
            project: ProjectSummary {
                name: self.project.name.clone(),
                location: self.project.location.clone(),
                start_date: self.project.start_date.clone(),
                planned_completion: self.project.planned_completion.clone(),
                current_progress: progress_percent(laid_area, self.project.planned_area),
            },
            telemetry,
        }
    }

    pub fn file_name(now: DateTime<Utc>) -> String {
        format!("grass_grid_project_{}.json", now.format("%Y-%m-%d"))
    }
}

fn progress_percent(done: f64, planned: f64) -> f64 {
    if planned <= 0.0 {
        return 0.0;
    }
    let percent = (done / planned * 100.0).clamp(0.0, 100.0);
    (percent * 10.0).round() / 10.0
}
