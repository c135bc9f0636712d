use crate::api::model::StatusResponse;
use crate::api::server::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState, timeout: Duration) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/status", get(status))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

#[allow(clippy::unused_async)]
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let last_refresh = state
        .snapshots
        .last_refresh()
        .and_then(|at| at.format(&Rfc3339).ok());
    Json(StatusResponse {
        last_refresh,
        jobs: state.snapshots.load().as_ref().clone(),
    })
}

#[allow(clippy::unused_async)]
async fn metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
