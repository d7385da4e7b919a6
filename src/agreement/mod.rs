//! Purchase agreements.
//!
//! # Data Flow
//! ```text
//! open_draft (property) → update_draft / sign (seller, buyer)
//!     → generate
//!         → hashing.rs (digest, pseudo-addresses, wei price)
//!         → ledger.rs AgreementLedger::create_agreement
//!         → on any failure: simulate.rs
//!         → record stored in `agreements` under the agreement id
//!     → document.rs (plain-text download)
//! verify (transaction id) → ledger.rs lookup
//! ```

pub mod document;
pub mod hashing;
pub mod ledger;
pub mod service;
pub mod simulate;
pub mod types;

pub use ledger::{AgreementLedger, ChainLedger};
pub use service::{AgreementError, AgreementService, DraftRegistry};
pub use types::{AgreementDraft, DraftPatch, GeneratedTransaction, Party, VerificationResult};
