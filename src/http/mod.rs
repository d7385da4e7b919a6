//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace span, timeout, body limit, metrics)
//!     → routes/*.rs (extract, call the current service generation)
//!     → response.rs (module errors → 400 / 404 / 502 JSON)
//!     → Send to client
//! ```

pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;

pub use response::ApiError;
pub use server::{AppState, HttpServer, ServerError, Services};
