//! Status endpoint served while a load run is in progress
//!
//! - `GET /health`: liveness, uptime and action totals so far
//! - `GET /metrics/prometheus`: Prometheus text exposition

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, extract::State, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::counters::RecordingCounters;

#[derive(Clone)]
pub struct StatusState {
    started: Instant,
    counters: Arc<RecordingCounters>,
    prometheus: Option<PrometheusHandle>,
}

impl StatusState {
    pub fn new(counters: Arc<RecordingCounters>) -> Self {
        Self {
            started: Instant::now(),
            counters,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    counters: BTreeMap<String, u64>,
}

async fn health(State(state): State<StatusState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started.elapsed().as_secs(),
        counters: state.counters.snapshot(),
    })
}

async fn prometheus_metrics(State(state): State<StatusState>) -> impl IntoResponse {
    match state.prometheus {
        Some(ref handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "Prometheus recorder not installed".to_string(),
        ),
    }
}

pub fn status_routes(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
