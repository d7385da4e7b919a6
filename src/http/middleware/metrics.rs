//! Request metrics middleware.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::observability::metrics;

/// Record count and latency per matched route template.
///
/// Unmatched paths are grouped under `unmatched` to keep label
/// cardinality bounded.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16();
    metrics::record_request(&method, &route, status, started.elapsed());
    if response.status().is_server_error() {
        tracing::warn!(method = %method, route = %route, status, "Request failed");
    }
    response
}
