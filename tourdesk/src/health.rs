//! Health endpoint

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::state::AppState;

/// Body returned by `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
}

/// Liveness probe; succeeds whenever the service can answer at all
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: state.config().service.name.clone(),
    })
}
