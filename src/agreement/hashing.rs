//! Agreement digests, pseudo-addresses and price conversion.

use alloy::hex;
use alloy::primitives::{Address, U256};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the JSON encoding of `payload`.
pub fn agreement_hash<T: Serialize>(payload: &T) -> Result<String, serde_json::Error> {
    let encoded = serde_json::to_vec(payload)?;
    Ok(hex::encode(Sha256::digest(&encoded)))
}

/// Deterministic placeholder address for a party: the first 20 bytes of
/// SHA-256 over the lower-cased e-mail. Nobody holds a key for it.
pub fn address_from_email(email: &str) -> Address {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    Address::from_slice(&digest[..20])
}

/// Convert a USD price to wei at a fixed USD/ETH rate.
///
/// The price is fixed to micro-dollars first so the conversion stays in
/// integer arithmetic.
pub fn price_to_wei(price_usd: f64, usd_per_eth: u64) -> U256 {
    if usd_per_eth == 0 || !price_usd.is_finite() || price_usd <= 0.0 {
        return U256::ZERO;
    }
    let micros = (price_usd * 1_000_000.0).round() as u128;
    U256::from(micros) * U256::from(1_000_000_000_000u64) / U256::from(usd_per_eth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256_of_json() {
        let hash = agreement_hash(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hex::encode(Sha256::digest(br#"{"a":1}"#)));
    }

    #[test]
    fn test_address_ignores_case() {
        let a = address_from_email("Seller@Example.com");
        let b = address_from_email("seller@example.com");
        assert_eq!(a, b);
        assert_ne!(a, address_from_email("buyer@example.com"));

        let digest = Sha256::digest(b"seller@example.com");
        assert_eq!(a.as_slice(), &digest[..20]);
    }

    #[test]
    fn test_price_to_wei() {
        // 2000 USD at 2000 USD/ETH is exactly one ether.
        assert_eq!(
            price_to_wei(2000.0, 2000),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(
            price_to_wei(500000.0, 2000),
            U256::from(250_000_000_000_000_000_000u128)
        );
        assert_eq!(price_to_wei(100.0, 0), U256::ZERO);
    }
}
