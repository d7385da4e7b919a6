//! Mail API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;
use crate::observability::metrics;

/// A single HTML message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("No recipients defined")]
    NoRecipient,

    #[error("Mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound mail seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Sends through an HTTP mail API using basic auth.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpMailer {
    pub fn new(config: &MailConfig, timeout: Duration) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if message.to.trim().is_empty() {
            return Err(MailError::NoRecipient);
        }

        let mut request = self.client.post(&self.api_url).json(message);
        if let Some(user) = &self.username {
            request = request.basic_auth(user, self.password.as_deref());
        }

        let result = async {
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
        .await;

        metrics::record_external_call("mail", result.is_ok());
        match &result {
            Ok(()) => tracing::info!(to = %message.to, subject = %message.subject, "Email sent"),
            Err(e) => tracing::error!(to = %message.to, error = %e, "Email send failed"),
        }
        result
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if message.to.trim().is_empty() {
            return Err(MailError::NoRecipient);
        }
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Mail delivery disabled, message logged only"
        );
        Ok(())
    }
}

/// Pick the mailer for the current configuration.
pub fn build_mailer(config: &MailConfig, timeout: Duration) -> Result<Arc<dyn Mailer>, MailError> {
    if !config.enabled {
        return Ok(Arc::new(LogMailer));
    }
    if config.username.is_none() {
        tracing::warn!("Mail enabled without EMAIL_USER; sending unauthenticated");
    }
    Ok(Arc::new(HttpMailer::new(config, timeout)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from: "tenant@example.com".into(),
            to: to.into(),
            subject: "New Maintenance Request for Your Property".into(),
            html: "<p>hi</p>".into(),
        }
    }

    #[tokio::test]
    async fn test_log_mailer_requires_recipient() {
        assert!(LogMailer.send(&message("owner@example.com")).await.is_ok());
        let err = LogMailer.send(&message("  ")).await.unwrap_err();
        assert_eq!(err.to_string(), "No recipients defined");
    }

    #[tokio::test]
    async fn test_http_mailer_reports_unreachable_api() {
        let config = MailConfig {
            enabled: true,
            api_url: "http://127.0.0.1:9/api/send".into(),
            ..MailConfig::default()
        };
        let mailer = HttpMailer::new(&config, Duration::from_secs(2)).unwrap();
        let err = mailer.send(&message("owner@example.com")).await.unwrap_err();
        assert!(matches!(err, MailError::Transport(_)));
    }
}
