//! Chain-specific types and error definitions.

use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Human-readable network name reported with agreements.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        1 => "mainnet".to_string(),
        11155111 => "sepolia".to_string(),
        17000 => "holesky".to_string(),
        31337 => "anvil".to_string(),
        other => format!("chain-{other}"),
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Transaction receipt did not arrive in time.
    #[error("Transaction not confirmed within {0} seconds")]
    ConfirmationTimeout(u64),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Blockchain client not initialized or disabled.
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1u64);
        assert_eq!(chain_id.0, 1);
        assert_eq!(u64::from(chain_id), 1);
    }

    #[test]
    fn test_network_names() {
        assert_eq!(network_name(1), "mainnet");
        assert_eq!(network_name(11155111), "sepolia");
        assert_eq!(network_name(31337), "anvil");
        assert_eq!(network_name(8453), "chain-8453");
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::ConfirmationTimeout(120);
        assert_eq!(err.to_string(), "Transaction not confirmed within 120 seconds");

        let err = BlockchainError::ChainMismatch { expected: 1, actual: 31337 };
        assert!(err.to_string().contains("31337"));
    }
}
