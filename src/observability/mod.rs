//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (subscriber setup, structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (per-request spans carrying the request ID)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the `x-request-id` header into every handler span
//! - Metric helpers are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
pub mod tracing;
