//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment (ESTATE_WALLET_PRIVATE_KEY, AGREEMENT_CONTRACT_ADDRESS)
//!     → wallet.rs (key loading)
//!     → client.rs (read-only RPC with failover and timeouts)
//!     → agreement::ledger (contract calls, receipts, events)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when blockchain unreachable

pub mod client;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use types::{network_name, BlockchainError, BlockchainResult, ChainId};
pub use wallet::Wallet;
