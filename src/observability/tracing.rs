//! Per-request spans.

use axum::http::Request;
use tracing::Span;

/// Header carrying the request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span factory for `TraceLayer::make_span_with`.
///
/// Runs after `SetRequestIdLayer`, so the header is always present for
/// requests that reached the router.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
