//! One-time password delivery and checking.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::IdentityConfig;
use crate::identity::IdentityError;

/// The code accepted on the phone channel by [`SimulatedOtp`].
pub const SIMULATED_PHONE_CODE: &str = "123456";
/// The code accepted on the national-ID channel by [`SimulatedOtp`].
pub const SIMULATED_ID_CODE: &str = "654321";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpChannel {
    Phone,
    NationalId,
}

impl OtpChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::NationalId => "national_id",
        }
    }
}

/// Sends and checks one-time passwords.
#[async_trait]
pub trait OtpProvider: Send + Sync {
    async fn send(&self, channel: OtpChannel, destination: &str) -> Result<(), IdentityError>;

    /// Whether `code` is correct for the destination.
    async fn verify(
        &self,
        channel: OtpChannel,
        destination: &str,
        code: &str,
    ) -> Result<bool, IdentityError>;
}

/// Nothing is delivered. Fixed codes pass after an artificial delay.
#[derive(Debug, Clone)]
pub struct SimulatedOtp {
    phone_send_delay: Duration,
    id_send_delay: Duration,
    verify_delay: Duration,
}

impl SimulatedOtp {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            phone_send_delay: Duration::from_millis(config.phone_send_delay_ms),
            id_send_delay: Duration::from_millis(config.id_send_delay_ms),
            verify_delay: Duration::from_millis(config.verify_delay_ms),
        }
    }

    /// No delays, for tests.
    pub fn instant() -> Self {
        Self {
            phone_send_delay: Duration::ZERO,
            id_send_delay: Duration::ZERO,
            verify_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl OtpProvider for SimulatedOtp {
    async fn send(&self, channel: OtpChannel, destination: &str) -> Result<(), IdentityError> {
        let delay = match channel {
            OtpChannel::Phone => self.phone_send_delay,
            OtpChannel::NationalId => self.id_send_delay,
        };
        tokio::time::sleep(delay).await;
        tracing::debug!(
            channel = channel.as_str(),
            destination_len = destination.len(),
            "Simulated OTP sent"
        );
        Ok(())
    }

    async fn verify(
        &self,
        channel: OtpChannel,
        _destination: &str,
        code: &str,
    ) -> Result<bool, IdentityError> {
        tokio::time::sleep(self.verify_delay).await;
        let expected = match channel {
            OtpChannel::Phone => SIMULATED_PHONE_CODE,
            OtpChannel::NationalId => SIMULATED_ID_CODE,
        };
        Ok(code == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_fixed_codes_pass() {
        let otp = SimulatedOtp::instant();
        assert!(otp.verify(OtpChannel::Phone, "9876543210", "123456").await.unwrap());
        assert!(!otp.verify(OtpChannel::Phone, "9876543210", "654321").await.unwrap());
        assert!(otp.verify(OtpChannel::NationalId, "123456789012", "654321").await.unwrap());
        assert!(!otp.verify(OtpChannel::NationalId, "123456789012", "000000").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_delays_apply() {
        let otp = SimulatedOtp::new(&IdentityConfig::default());
        let started = tokio::time::Instant::now();
        otp.send(OtpChannel::NationalId, "123456789012").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
