//! Client API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use servicedesk_core::{Client, ClientUpdate};
use std::sync::Arc;
use tracing::info;

use super::body::{parse_patch, parse_record, require_fields, IdParams};
use super::error::{created, ok, ApiError, OkResponse};
use crate::metrics::record_write;
use crate::state::AppState;

const COLLECTION: &str = "clients";

/// List all clients ordered by name
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(state.clients().list()?))
}

/// Insert a client, or overwrite the one with the same id
pub async fn upsert_client(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<OkResponse>), ApiError> {
    require_fields(&body, &["id", "name"])?;
    let client: Client = parse_record(body, "client")?;

    let result = state.clients().upsert(&client);
    record_write(COLLECTION, &result);
    result?;

    info!(client_id = %client.id, "Client saved");
    Ok(created())
}

pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<OkResponse>, ApiError> {
    let (id, update): (String, ClientUpdate) = parse_patch(&body)?;

    let result = state.clients().update(&id, &update);
    record_write(COLLECTION, &result);
    result?;

    info!(client_id = %id, field = update.field(), "Client updated");
    Ok(ok())
}

/// Delete a client by `?id=`. Refused with 409 while tickets reference it.
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = params.require()?;

    let result = state.clients().delete(&id);
    record_write(COLLECTION, &result);
    result?;

    info!(client_id = %id, "Client deleted");
    Ok(ok())
}
