//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, environment secrets)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared with the HTTP layer and services
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → server rebuilds its service layer and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Secrets (mail credentials, payment key, wallet key) come only from the environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{
    AdminConfig, AppConfig, BlockchainConfig, IdentityConfig, ListenerConfig, ListingConfig,
    MailConfig, ObservabilityConfig, PaymentConfig, PredictionConfig, RetentionConfig,
    SecurityConfig, StoreConfig, TimeoutConfig,
};
