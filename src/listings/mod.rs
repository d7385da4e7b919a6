//! Property listings.
//!
//! # Data Flow
//! ```text
//! GET /api/properties[?status=]      → service.rs list_properties
//! GET /api/properties/{key}          → service.rs get_property (key, then house ID)
//! POST /api/properties (multipart)
//!     → submission.rs (ordered validation, first failure wins)
//!     → BlobStore put properties/<millis>-<name>
//!     → DocumentStore insert into `properties`
//! ```

pub mod service;
pub mod submission;
pub mod types;

pub use service::{find_property, ListingService};
pub use submission::ListingLimits;
pub use types::{ImageUpload, ListingError, PropertyStatus, PropertySubmission, PropertyView};
