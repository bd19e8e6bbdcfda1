use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use servicedesk_core::Config;
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

#[derive(Serialize)]
pub struct SetupResponse {
    pub ok: bool,
    pub msg: String,
}

/// Create the tables if they are missing. Safe to call any number of times.
pub async fn setup(State(state): State<Arc<AppState>>) -> Result<Json<SetupResponse>, ApiError> {
    state.setup()?;
    info!("Schema ensured");
    Ok(Json(SetupResponse {
        ok: true,
        msg: "Tables created/updated".to_string(),
    }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
