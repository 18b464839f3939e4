// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use crate::application::export_service::ExportService;
use crate::application::seed_source::load_or_synthesize;
use crate::application::telemetry_store::TelemetryStore;
use crate::domain::telemetry::{Topic, TopicUpdate};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::seed_repository::seed_source_from;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Seed the telemetry tree (falls back to synthetic data)
    let mut rng = StdRng::from_os_rng();
    let seed_source = seed_source_from(&app_config.seed);
    let tree = load_or_synthesize(seed_source.as_ref(), &mut rng).await;

    // Create the store (application layer)
    let store = TelemetryStore::new(tree, app_config.simulation.to_simulation_config(), rng);
    store.subscribe(
        Topic::Alerts,
        Arc::new(|update: &TopicUpdate| {
            if let TopicUpdate::Alerts(alerts) = update {
                tracing::info!(
                    critical = alerts.critical.len(),
                    warnings = alerts.warnings.len(),
                    info = alerts.info.len(),
                    "alert raised"
                );
            }
        }),
    );
    let export_service = ExportService::new(store.clone(), app_config.project.clone());

    let update_interval = app_config.simulation.update_interval();
    store.start_updates(update_interval);

    // Create application state
    let state = Arc::new(AppState {
        store: store.clone(),
        export_service,
        update_interval,
        seed_source,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = app_config.server.bind.parse()?;
    tracing::info!("Starting sand-control-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    store.dispose();
    tracing::info!("Shut down");

    Ok(())
}
