//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the marketplace
//! service. All types derive Serde traits for deserialization from config files.
//! Secrets are never read from the file; `loader.rs` fills them from the
//! environment.

use serde::{Deserialize, Serialize};

/// Root configuration for the marketplace service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Document and blob storage.
    pub store: StoreConfig,

    /// Listing submission limits.
    pub listings: ListingConfig,

    /// Simulated OTP delays.
    pub identity: IdentityConfig,

    /// Lifetime of in-memory verification sessions and agreement drafts.
    pub retention: RetentionConfig,

    /// Transactional mail API.
    pub mail: MailConfig,

    /// External price model server.
    pub prediction: PredictionConfig,

    /// Agreement contract and chain access.
    pub blockchain: BlockchainConfig,

    #[serde(default)]
    pub payments: PaymentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for calls to external HTTP services in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            upstream_secs: 15,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file the document store is persisted to. `None` keeps it in memory.
    pub persistence_path: Option<String>,

    /// Directory uploaded images are written to.
    pub media_root: String,

    /// URL prefix under which `media_root` is served.
    pub public_media_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persistence_path: None,
            media_root: "media".to_string(),
            public_media_url: "/media".to_string(),
        }
    }
}

/// Listing submission limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Maximum accepted image size in bytes.
    pub max_image_bytes: usize,

    /// Minimum description length in characters.
    pub min_description_chars: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 5 * 1024 * 1024,
            min_description_chars: 50,
        }
    }
}

/// Delays applied by the simulated OTP provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub phone_send_delay_ms: u64,
    pub id_send_delay_ms: u64,
    pub verify_delay_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            phone_send_delay_ms: 1000,
            id_send_delay_ms: 1500,
            verify_delay_ms: 1000,
        }
    }
}

/// How long in-memory sessions and drafts are kept.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Seconds a verification session stays usable after it was started.
    pub session_ttl_secs: u64,

    /// Seconds an agreement draft stays open after it was created.
    pub draft_ttl_secs: u64,

    /// Interval of the background sweep that drops expired entries.
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 30 * 60,
            draft_ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 60,
        }
    }
}

/// Transactional mail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    /// Send through the mail API. When disabled, messages are only logged.
    pub enabled: bool,

    /// Mail API endpoint accepting `{from, to, subject, html}`.
    pub api_url: String,

    /// Sender used when the tenant did not supply an address.
    pub default_sender: String,

    /// Subject of the owner notification.
    pub owner_subject: String,

    /// Also send an acknowledgement copy to the tenant.
    pub send_tenant_copy: bool,

    /// Mail account user. Loaded from `EMAIL_USER`.
    #[serde(skip)]
    pub username: Option<String>,

    /// Mail account password. Loaded from `EMAIL_APP_PASSWORD`.
    #[serde(skip)]
    pub password: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "http://localhost:8025/api/send".to_string(),
            default_sender: "no-reply@estate-market.local".to_string(),
            owner_subject: "New Maintenance Request for Your Property".to_string(),
            send_tenant_copy: false,
            username: None,
            password: None,
        }
    }
}

/// Price model server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Model server endpoint receiving the feature object.
    pub endpoint: String,

    /// Fall back to the offline heuristic when the model server is unreachable.
    pub offline_fallback: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/predict/".to_string(),
            offline_fallback: false,
        }
    }
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Enable blockchain integration.
    pub enabled: bool,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required before a receipt counts.
    pub confirmation_blocks: u32,

    /// Address of the agreement contract. Overridden by `AGREEMENT_CONTRACT_ADDRESS`.
    pub contract_address: String,

    /// Fixed conversion rate used to price agreements in wei.
    pub usd_per_eth: u64,

    /// How long to wait for the agreement transaction receipt.
    pub receipt_timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            usd_per_eth: 2000,
            receipt_timeout_secs: 120,
        }
    }
}

/// Payment gateway credentials.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PaymentConfig {
    /// Gateway key. Loaded from `PAYMENT_GATEWAY_KEY`.
    #[serde(skip)]
    pub gateway_key: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes (covers image uploads).
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 8 * 1024 * 1024, // 8MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listings.min_description_chars, 50);
        assert_eq!(config.prediction.endpoint, "http://127.0.0.1:8000/predict/");
        assert!(!config.blockchain.enabled);
        assert_eq!(config.blockchain.usd_per_eth, 2000);
    }

    #[test]
    fn test_secrets_are_not_read_from_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [mail]
            enabled = true
            username = "should-be-ignored"
            "#,
        )
        .unwrap();

        assert!(config.mail.enabled);
        assert!(config.mail.username.is_none());
    }
}
