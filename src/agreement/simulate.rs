//! Offline stand-in for anchoring an agreement.

use chrono::{SecondsFormat, Utc};
use rand::Rng;

use crate::agreement::types::GeneratedTransaction;

/// Network name attached to simulated transactions.
pub const SIMULATED_NETWORK: &str = "development";

/// Prefix that marks a transaction id as simulated.
pub const SIMULATED_TX_PREFIX: &str = "tx_";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A confirmed-looking transaction with random identifiers.
pub fn simulate_transaction() -> GeneratedTransaction {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    GeneratedTransaction {
        transaction_id: format!("{SIMULATED_TX_PREFIX}{suffix}"),
        agreement_id: rng.gen_range(0..1_000_000u32).to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        status: "confirmed".to_string(),
        block_number: rng.gen_range(0..1_000_000u64),
        network: SIMULATED_NETWORK.to_string(),
        simulated: true,
    }
}

pub fn is_simulated_id(transaction_id: &str) -> bool {
    transaction_id.starts_with(SIMULATED_TX_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_shape() {
        let tx = simulate_transaction();
        assert!(is_simulated_id(&tx.transaction_id));
        assert_eq!(tx.transaction_id.len(), 12);
        assert!(tx.transaction_id[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(tx.agreement_id.parse::<u32>().unwrap() < 1_000_000);
        assert!(tx.block_number < 1_000_000);
        assert_eq!(tx.status, "confirmed");
        assert_eq!(tx.network, "development");
        assert!(tx.simulated);
        assert!(chrono::DateTime::parse_from_rfc3339(&tx.timestamp).is_ok());
    }

    #[test]
    fn test_real_hashes_are_not_simulated() {
        assert!(!is_simulated_id(
            "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060"
        ));
    }
}
