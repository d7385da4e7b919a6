//! Metrics collection and exposition.
//!
//! # Metrics
//! - `estate_requests_total` (counter): requests by method, route, status
//! - `estate_request_duration_seconds` (histogram): latency by route
//! - `estate_external_calls_total` (counter): calls to the mail API, model
//!   server and chain by service and outcome
//! - `estate_store_writes_total` (counter): document writes by collection
//! - `estate_agreements_total` (counter): generated agreements, simulated or not
//! - `estate_otp_attempts_total` (counter): OTP verifications by channel and outcome

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from inside the tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, elapsed: Duration) {
    counter!(
        "estate_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("estate_request_duration_seconds", "route" => route.to_string())
        .record(elapsed.as_secs_f64());
}

/// `service` is one of `mail`, `prediction`, `chain`.
pub fn record_external_call(service: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("estate_external_calls_total", "service" => service, "outcome" => outcome)
        .increment(1);
}

pub fn record_document_write(collection: &str) {
    counter!("estate_store_writes_total", "collection" => collection.to_string()).increment(1);
}

pub fn record_agreement(simulated: bool) {
    let mode = if simulated { "simulated" } else { "onchain" };
    counter!("estate_agreements_total", "mode" => mode).increment(1);
}

pub fn record_otp_attempt(channel: &'static str, success: bool) {
    let outcome = if success { "accepted" } else { "rejected" };
    counter!("estate_otp_attempts_total", "channel" => channel, "outcome" => outcome)
        .increment(1);
}
