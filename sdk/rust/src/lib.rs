//! Client for the marketplace HTTP API.

pub mod client;

pub use client::{ApiResponse, ImageFile, MarketClient, Party};
