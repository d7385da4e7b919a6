//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build stores, ledger, sessions → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Flush store → Exit
//!
//! Sweeper (sweeper.rs):
//!     Interval tick → Purge expired sessions and drafts → Stop on shutdown
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a store that cannot be opened is fatal
//! - A ledger that cannot be reached is not: agreements fall back to simulation

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod sweeper;

pub use shutdown::Shutdown;
pub use startup::{build_components, Components, StartupError};
pub use sweeper::spawn_sweeper;
