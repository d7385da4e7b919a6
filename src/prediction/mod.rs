//! Price prediction through the external model server.
//!
//! # Data Flow
//! ```text
//! POST /api/predict (form) → types.rs validate → client.rs predict
//!     → model server {Area, Bedrooms, ...} → predicted_price
//!     → unreachable + offline_fallback → heuristic.rs
//! POST /predict (raw) → client.rs forward → upstream status and body
//! ```

pub mod client;
pub mod heuristic;
pub mod types;

use thiserror::Error;

pub use client::{ForwardedResponse, PredictionClient};
pub use types::{Features, Prediction, PredictionForm, PredictionSource};

#[derive(Debug, Error)]
pub enum PredictionError {
    /// Validation failure with its user-facing message.
    #[error("{0}")]
    Invalid(String),

    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("Model server request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected model server response: {0}")]
    InvalidResponse(String),
}
