//! Ticket API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use servicedesk_core::{Ticket, TicketUpdate};
use std::sync::Arc;
use tracing::info;

use super::body::{parse_patch, parse_record, require_fields, IdParams};
use super::error::{created, ok, ApiError, OkResponse};
use crate::metrics::record_write;
use crate::state::AppState;

const COLLECTION: &str = "tickets";

/// List all tickets in insertion order
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    Ok(Json(state.tickets().list()?))
}

/// Create a ticket. The referenced client must exist.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<OkResponse>), ApiError> {
    require_fields(&body, &["id", "client_id", "title"])?;
    let ticket: Ticket = parse_record(body, "ticket")?;

    let result = state.tickets().create(&ticket);
    record_write(COLLECTION, &result);
    result?;

    info!(ticket_id = %ticket.id, client_id = %ticket.client_id, "Ticket created");
    Ok(created())
}

/// Change a single field
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<OkResponse>, ApiError> {
    let (id, update): (String, TicketUpdate) = parse_patch(&body)?;

    let result = state.tickets().update(&id, &update);
    record_write(COLLECTION, &result);
    result?;

    info!(ticket_id = %id, field = update.field(), "Ticket updated");
    Ok(ok())
}

/// Delete a ticket by `?id=`
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = params.require()?;

    let result = state.tickets().delete(&id);
    record_write(COLLECTION, &result);
    result?;

    info!(ticket_id = %id, "Ticket deleted");
    Ok(ok())
}
