//! Real-estate marketplace backend.

pub mod config;
pub mod http;
pub mod store;
pub mod mail;
pub mod listings;
pub mod identity;
pub mod maintenance;
pub mod agreement;
pub mod prediction;
pub mod blockchain;
pub mod lifecycle;
pub mod observability;
pub mod admin;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Components, Shutdown};
