//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Mail account user.
pub const EMAIL_USER_ENV_VAR: &str = "EMAIL_USER";
/// Mail account password.
pub const EMAIL_PASSWORD_ENV_VAR: &str = "EMAIL_APP_PASSWORD";
/// Payment gateway key.
pub const PAYMENT_KEY_ENV_VAR: &str = "PAYMENT_GATEWAY_KEY";
/// Agreement contract address.
pub const CONTRACT_ADDRESS_ENV_VAR: &str = "AGREEMENT_CONTRACT_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    finish(config)
}

/// Defaults plus environment overrides, for running without a config file.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    finish(AppConfig::default())
}

fn finish(mut config: AppConfig) -> Result<AppConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Fill secrets and deploy-specific values from the environment.
///
/// Values are taken as-is; empty variables count as unset.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    config.mail.username = get(EMAIL_USER_ENV_VAR);
    config.mail.password = get(EMAIL_PASSWORD_ENV_VAR);
    config.payments.gateway_key = get(PAYMENT_KEY_ENV_VAR);

    if let Some(address) = get(CONTRACT_ADDRESS_ENV_VAR) {
        config.blockchain.contract_address = address;
    }

    tracing::debug!(
        mail_user = if config.mail.username.is_some() { "set" } else { "not set" },
        mail_password = if config.mail.password.is_some() { "set" } else { "not set" },
        payment_key = if config.payments.gateway_key.is_some() { "set" } else { "not set" },
        "Environment overrides applied"
    );
}
