//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that enabled integrations carry what they need
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use alloy::primitives::Address;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }

    let retention = [
        ("retention.session_ttl_secs", config.retention.session_ttl_secs),
        ("retention.draft_ttl_secs", config.retention.draft_ttl_secs),
        ("retention.sweep_interval_secs", config.retention.sweep_interval_secs),
    ];
    for (field, value) in retention {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    if config.listings.max_image_bytes > config.security.max_body_size {
        errors.push(ValidationError::new(
            "listings.max_image_bytes",
            "must not exceed security.max_body_size",
        ));
    }

    if url::Url::parse(&config.prediction.endpoint).is_err() {
        errors.push(ValidationError::new(
            "prediction.endpoint",
            format!("'{}' is not a URL", config.prediction.endpoint),
        ));
    }

    if config.mail.enabled && url::Url::parse(&config.mail.api_url).is_err() {
        errors.push(ValidationError::new(
            "mail.api_url",
            format!("'{}' is not a URL", config.mail.api_url),
        ));
    }

    if config.blockchain.enabled {
        if url::Url::parse(&config.blockchain.rpc_url).is_err() {
            errors.push(ValidationError::new(
                "blockchain.rpc_url",
                format!("'{}' is not a URL", config.blockchain.rpc_url),
            ));
        }
        if config.blockchain.contract_address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "blockchain.contract_address",
                format!("'{}' is not an address", config.blockchain.contract_address),
            ));
        }
        if config.blockchain.usd_per_eth == 0 {
            errors.push(ValidationError::new("blockchain.usd_per_eth", "must be greater than 0"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::new("admin.api_key", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nope".to_string();
        config.timeouts.request_secs = 0;
        config.blockchain.enabled = true;
        config.blockchain.contract_address = "0x123".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["listener.bind_address", "timeouts.request_secs", "blockchain.contract_address"]
        );
    }

    #[test]
    fn test_mail_url_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.mail.api_url = "not a url".to_string();
        assert!(validate_config(&config).is_ok());

        config.mail.enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_retention_must_be_positive() {
        let mut config = AppConfig::default();
        config.retention.draft_ttl_secs = 0;
        config.retention.sweep_interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["retention.draft_ttl_secs", "retention.sweep_interval_secs"]
        );
    }
}
