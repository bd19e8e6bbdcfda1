//! Work order API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use servicedesk_core::{Order, OrderUpdate};
use std::sync::Arc;
use tracing::info;

use super::body::{parse_patch, parse_record, require_fields, IdParams};
use super::error::{created, ok, ApiError, OkResponse};
use crate::metrics::record_write;
use crate::state::AppState;

const COLLECTION: &str = "orders";

/// List all orders, most recent first
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders().list()?))
}

/// Create an order. `created_at` is assigned here, whatever the body says.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<OkResponse>), ApiError> {
    require_fields(&body, &["id", "number", "title"])?;
    let order: Order = parse_record(body, "order")?;

    let result = state.orders().create(&order);
    record_write(COLLECTION, &result);
    let stored = result?;

    info!(order_id = %stored.id, number = %stored.number, "Order created");
    Ok(created())
}

pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<OkResponse>, ApiError> {
    let (id, update): (String, OrderUpdate) = parse_patch(&body)?;

    let result = state.orders().update(&id, &update);
    record_write(COLLECTION, &result);
    result?;

    info!(order_id = %id, field = update.field(), "Order updated");
    Ok(ok())
}

/// Delete an order by `?id=`
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IdParams>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = params.require()?;

    let result = state.orders().delete(&id);
    record_write(COLLECTION, &result);
    result?;

    info!(order_id = %id, "Order deleted");
    Ok(ok())
}
