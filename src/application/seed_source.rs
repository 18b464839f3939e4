// Seed source trait - Where the initial telemetry tree comes from
use crate::application::synthetic::synthesize_tree;
use crate::domain::telemetry::TelemetryTree;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch seed from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("seed request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("seed document is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait SeedSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<TelemetryTree, SeedError>;
}

/// Loads the seed once; any failure falls back to the synthetic tree without retrying.
/// Loaded positions are confined to the seed's work area.
pub async fn load_or_synthesize<R: Rng>(source: &dyn SeedSource, rng: &mut R) -> TelemetryTree {
    match source.load().await {
        Ok(mut tree) => {
            tree.confine_to_work_area();
            tracing::info!(
                source = %source.describe(),
                metrics = tree.environment_data.len(),
                equipment = tree.equipment_data.len(),
                "loaded telemetry seed"
            );
            tree
        }
        Err(e) => {
            tracing::warn!(
                source = %source.describe(),
                error = %e,
                "seed load failed, using synthetic telemetry"
            );
            synthesize_tree(rng, Utc::now())
        }
    }
}
