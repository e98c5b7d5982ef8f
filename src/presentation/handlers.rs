// HTTP request handlers
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/positions", get(list_positions))
        .route("/history", get(get_history))
        .route("/insight", get(get_insight))
        .route("/refresh", post(refresh))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard view
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dashboard = state.dashboard_service.dashboard();
    into_response(json_response(&dashboard, accepts_brotli(&headers)).await)
}

/// Map markers, capped at the configured limit
pub async fn list_positions(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let markers = state.dashboard_service.markers();
    into_response(json_response(&markers, accepts_brotli(&headers)).await)
}

/// Downsampled altitude series
pub async fn get_history(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let history = state.dashboard_service.altitude_history();
    into_response(json_response(&history.samples, accepts_brotli(&headers)).await)
}

#[derive(Serialize)]
pub struct InsightBody {
    pub text: String,
    pub revision: Option<u64>,
}

/// Text of the insights card
pub async fn get_insight(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let insight = state.dashboard_service.insight();
    let body = InsightBody {
        text: insight.text.display().to_string(),
        revision: insight.revision,
    };
    into_response(json_response(&body, accepts_brotli(&headers)).await)
}

#[derive(Serialize)]
pub struct RefreshBody {
    pub revision: u64,
    pub records: usize,
}

/// Re-fetch every hourly snapshot
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshBody> {
    let (revision, records) = state.fetcher.refresh().await;
    Json(RefreshBody { revision, records })
}

/// Stream the dashboard progressively
pub async fn stream_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rx = state.streaming_service.stream_dashboard().await;
    stream_from_receiver(rx, accepts_brotli(&headers)).await
}

fn into_response(result: Result<axum::response::Response, axum::http::StatusCode>) -> axum::response::Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
