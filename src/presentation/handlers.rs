// HTTP request handlers
use crate::application::export_service::ExportService;
use crate::application::seed_source::load_or_synthesize;
use crate::application::topic_feed::TopicFeed;
use crate::domain::telemetry::{TelemetryTree, Topic};
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::json_stream::stream_from_receiver;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;

const STREAM_BUFFER: usize = 32;

#[derive(Serialize)]
pub struct UpdatesStatus {
    pub running: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full telemetry tree
pub async fn get_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.get_all())
}

fn parse_topic(raw: &str) -> Result<Topic, Response> {
    raw.parse::<Topic>().map_err(|e| {
        tracing::debug!("rejecting request: {}", e);
        (StatusCode::NOT_FOUND, e.to_string()).into_response()
    })
}

/// Current subtree of one topic
pub async fn get_topic(
    Path(topic): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match parse_topic(&topic) {
        Ok(topic) => Json(state.store.snapshot(topic)).into_response(),
        Err(response) => response,
    }
}

/// Live updates of one topic as newline-delimited JSON
pub async fn stream_topic(
    Path(topic): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let topic = match parse_topic(&topic) {
        Ok(topic) => topic,
        Err(response) => return response,
    };

    let (feed, rx) = TopicFeed::open(&state.store, topic, STREAM_BUFFER);
    stream_from_receiver(rx, feed).into_response()
}

/// Downloadable project document
pub async fn export(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let now = Utc::now();
    let document = state.export_service.build(now);
    let file_name = ExportService::file_name(now);

    match json_response(&document, accepts_brotli(&headers), Some(&file_name)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Reloads the seed (or synthesizes a fresh tree) and replaces the live state
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<TelemetryTree> {
    let mut rng = StdRng::from_os_rng();
    let tree = load_or_synthesize(state.seed_source.as_ref(), &mut rng).await;
    state.store.replace_tree(tree);
    Json(state.store.get_all())
}

pub async fn start_updates(State(state): State<Arc<AppState>>) -> Json<UpdatesStatus> {
    state.store.start_updates(state.update_interval);
    Json(UpdatesStatus {
        running: state.store.is_running(),
    })
}

pub async fn stop_updates(State(state): State<Arc<AppState>>) -> Json<UpdatesStatus> {
    state.store.stop_updates();
    Json(UpdatesStatus {
        running: state.store.is_running(),
    })
}
