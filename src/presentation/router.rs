// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    export, get_all, get_topic, health_check, reset, start_updates, stop_updates, stream_topic,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/telemetry", get(get_all))
        .route("/telemetry/reset", post(reset))
        .route("/telemetry/:topic", get(get_topic))
        .route("/telemetry/:topic/stream", get(stream_topic))
        .route("/export", get(export))
        .route("/updates/start", post(start_updates))
        .route("/updates/stop", post(stop_updates))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
