//! Prometheus metrics for observability.
//!
//! - HTTP request metrics (latency, counts, in flight)
//! - Collection writes by collection and outcome
//! - Row counts per collection (collected when scraped)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "servicedesk_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("servicedesk_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "servicedesk_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Collection Metrics
// =============================================================================

/// Writes (create, update, delete) per collection and outcome.
pub static COLLECTION_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "servicedesk_collection_writes_total",
            "Collection writes by collection and outcome",
        ),
        &["collection", "outcome"],
    )
    .unwrap()
});

/// Rows per collection (collected dynamically).
pub static COLLECTION_ROWS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("servicedesk_collection_rows", "Current row count by collection"),
        &["collection"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Collections
    registry
        .register(Box::new(COLLECTION_WRITES.clone()))
        .unwrap();
    registry
        .register(Box::new(COLLECTION_ROWS.clone()))
        .unwrap();
}

/// Count a write against `collection`.
pub fn record_write<T, E>(collection: &str, result: &Result<T, E>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    COLLECTION_WRITES
        .with_label_values(&[collection, outcome])
        .inc();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Refresh the row gauges from the database before a scrape.
pub fn collect_dynamic_metrics(state: &AppState) {
    if let Ok(clients) = state.clients().list() {
        COLLECTION_ROWS
            .with_label_values(&["clients"])
            .set(clients.len() as i64);
    }
    if let Ok(tickets) = state.tickets().list() {
        COLLECTION_ROWS
            .with_label_values(&["tickets"])
            .set(tickets.len() as i64);
    }
    if let Ok(orders) = state.orders().list() {
        COLLECTION_ROWS
            .with_label_values(&["orders"])
            .set(orders.len() as i64);
    }
}

/// Routes that get their own label. Anything else is labelled "other".
const KNOWN_PATHS: &[&str] = &[
    "/api/clients",
    "/api/tickets",
    "/api/orders",
    "/api/setup",
    "/api/v1/health",
    "/api/v1/config",
    "/metrics",
];

/// Normalize a path for metric labels.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if KNOWN_PATHS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "other".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_paths() {
        assert_eq!(normalize_path("/api/tickets"), "/api/tickets");
        assert_eq!(normalize_path("/api/orders/"), "/api/orders");
        assert_eq!(normalize_path("/metrics"), "/metrics");
    }

    #[test]
    fn test_normalize_unknown_paths() {
        assert_eq!(normalize_path("/api/tickets/550e8400"), "other");
        assert_eq!(normalize_path("/"), "other");
        assert_eq!(normalize_path("/wp-admin"), "other");
    }

    #[test]
    fn test_record_write_counts_by_outcome() {
        let before_ok = COLLECTION_WRITES.with_label_values(&["orders", "ok"]).get();
        let before_err = COLLECTION_WRITES.with_label_values(&["orders", "error"]).get();

        record_write::<(), ()>("orders", &Ok(()));
        record_write::<(), ()>("orders", &Err(()));

        assert!(COLLECTION_WRITES.with_label_values(&["orders", "ok"]).get() > before_ok);
        assert!(COLLECTION_WRITES.with_label_values(&["orders", "error"]).get() > before_err);
    }

    #[test]
    fn test_encode_contains_registered_metrics() {
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        let text = encode_metrics();
        assert!(text.contains("servicedesk_http_requests_in_flight"));
    }
}
