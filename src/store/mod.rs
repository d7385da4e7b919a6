//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! services
//!     → document.rs (DocumentStore trait, typed helpers)
//!     → memory.rs (dashmap collections, JSON snapshot on disk)
//!
//! verification sessions, agreement drafts
//!     → expiring.rs (dashmap entries with a time-to-live)
//!
//! listing images
//!     → blob.rs (BlobStore trait, files under the media root)
//!     → served back at /media by the HTTP layer
//! ```

pub mod blob;
pub mod document;
pub mod expiring;
pub mod memory;

pub use blob::{BlobStore, FsBlobStore};
pub use document::{
    collections, field_f64, field_str, to_document, Document, DocumentStore, StoreError, StoreResult, StoredDocument,
};
pub use expiring::ExpiringMap;
pub use memory::MemoryStore;
