//! Identity verification.
//!
//! # Data Flow
//! ```text
//! start_session
//!     → send_phone_otp / verify_phone_otp     (otp.rs, channel Phone)
//!     → send_id_otp / verify_id_otp           (otp.rs, channel NationalId)
//!     → complete (full name) → `users`, looked up by idNumber first
//! ```
//!
//! The bundled [`SimulatedOtp`] delivers nothing and accepts fixed codes.

pub mod otp;
pub mod service;
pub mod validation;

use thiserror::Error;

use crate::store::StoreError;

pub use otp::{OtpChannel, OtpProvider, SimulatedOtp};
pub use service::{CompletedVerification, IdentityService, SessionRegistry, VerificationSession};

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Validation failure with its user-facing message.
    #[error("{0}")]
    Invalid(&'static str),

    #[error("Verification session not found")]
    SessionNotFound,

    #[error("OTP delivery failed: {0}")]
    Delivery(String),

    #[error("Failed to complete verification. Please try again.")]
    Store(#[from] StoreError),
}
