use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{clients, handlers, middleware::metrics_middleware, orders, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Collections: GET list, POST create, PATCH single field, DELETE ?id=
    let collection_routes = Router::new()
        .route(
            "/clients",
            get(clients::list_clients)
                .post(clients::upsert_client)
                .patch(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/tickets",
            get(tickets::list_tickets)
                .post(tickets::create_ticket)
                .patch(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route(
            "/orders",
            get(orders::list_orders)
                .post(orders::create_order)
                .patch(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/setup", post(handlers::setup));

    // Service routes
    let service_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config));

    Router::new()
        .nest("/api", collection_routes)
        .nest("/api/v1", service_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
