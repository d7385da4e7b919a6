//! Tenant maintenance workflow.
//!
//! # Data Flow
//! ```text
//! submit_request
//!     → required fields, "other" text, urgency
//!     → property lookup by house ID (no insert, no mail when missing)
//!     → insert into `maintenanceRequests` as Pending
//!     → one owner notification through the Mailer; failure is logged only
//! requests_for_house → newest first
//! mark_completed     → status + completedAt
//! send_owner_email   → the standalone owner e-mail route
//! ```

pub mod service;
pub mod types;

use thiserror::Error;

use crate::store::StoreError;

pub use service::{MaintenanceService, NotificationSettings};
pub use types::{
    HouseRequests, MaintenanceRequest, MaintenanceSubmission, OwnerEmailRequest, RequestStatus,
    SubmissionOutcome, Urgency,
};

#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// Validation failure with its user-facing message.
    #[error("{0}")]
    Invalid(&'static str),

    #[error("{0}")]
    PropertyNotFound(&'static str),

    #[error("Maintenance request not found")]
    RequestNotFound,

    #[error("Error submitting maintenance request. Please try again.")]
    Store(#[from] StoreError),
}
