//! Verification sessions and user registration.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::identity::otp::{OtpChannel, OtpProvider};
use crate::identity::validation::{check_full_name, check_otp, normalize_id_number, normalize_phone};
use crate::identity::IdentityError;
use crate::observability::metrics;
use crate::store::{collections, to_document, DocumentStore, ExpiringMap};

pub const MSG_REQUEST_OTP_FIRST: &str = "Please request an OTP first";
pub const MSG_PHONE_OTP_INVALID: &str = "Invalid OTP. Please try again.";
pub const MSG_ID_OTP_INVALID: &str = "Invalid ID OTP. Please try again.";
pub const MSG_PHONE_NOT_VERIFIED: &str = "Please verify your phone number";
pub const MSG_ID_NOT_VERIFIED: &str = "Please verify your ID number";

/// Progress of one visitor through the verification form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSession {
    pub session_id: String,
    #[serde(skip)]
    pub phone_number: Option<String>,
    pub phone_otp_sent: bool,
    pub phone_verified: bool,
    #[serde(skip)]
    pub id_number: Option<String>,
    pub id_otp_sent: bool,
    pub id_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl VerificationSession {
    fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            phone_number: None,
            phone_otp_sent: false,
            phone_verified: false,
            id_number: None,
            id_otp_sent: false,
            id_verified: false,
            created_at: Utc::now(),
        }
    }
}

/// Stored user record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewUser<'a> {
    full_name: &'a str,
    phone_number: &'a str,
    id_number: &'a str,
    phone_verified: bool,
    id_verified: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedVerification {
    pub user_id: String,
    /// False when a user with the same ID number already existed.
    pub created: bool,
}

/// Open sessions, shared across config reloads. Abandoned sessions expire
/// after the configured time-to-live.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: ExpiringMap<VerificationSession>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: ExpiringMap::new(ttl),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop expired sessions and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.sessions.purge_expired()
    }

    fn insert(&self, session: VerificationSession) {
        self.sessions.insert(session.session_id.clone(), session);
    }

    fn get(&self, id: &str) -> Result<VerificationSession, IdentityError> {
        self.sessions.get(id).ok_or(IdentityError::SessionNotFound)
    }

    fn modify<F>(&self, id: &str, f: F) -> Result<VerificationSession, IdentityError>
    where
        F: FnOnce(&mut VerificationSession),
    {
        self.sessions
            .modify(id, |session| {
                f(session);
                session.clone()
            })
            .ok_or(IdentityError::SessionNotFound)
    }

    fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }
}

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn DocumentStore>,
    sessions: Arc<SessionRegistry>,
    otp: Arc<dyn OtpProvider>,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sessions: Arc<SessionRegistry>,
        otp: Arc<dyn OtpProvider>,
    ) -> Self {
        Self { store, sessions, otp }
    }

    pub fn start_session(&self) -> VerificationSession {
        let session = VerificationSession::new();
        self.sessions.insert(session.clone());
        tracing::debug!(session_id = %session.session_id, "Verification session started");
        session
    }

    pub fn get_session(&self, session_id: &str) -> Result<VerificationSession, IdentityError> {
        self.sessions.get(session_id)
    }

    /// Send a code to the phone. A new number clears an earlier verification.
    pub async fn send_phone_otp(
        &self,
        session_id: &str,
        phone: &str,
    ) -> Result<VerificationSession, IdentityError> {
        self.sessions.get(session_id)?;
        let phone = normalize_phone(phone)?;
        self.otp.send(OtpChannel::Phone, &phone).await?;

        self.sessions.modify(session_id, |s| {
            if s.phone_number.as_deref() != Some(phone.as_str()) {
                s.phone_verified = false;
            }
            s.phone_number = Some(phone);
            s.phone_otp_sent = true;
        })
    }

    pub async fn send_id_otp(
        &self,
        session_id: &str,
        id_number: &str,
    ) -> Result<VerificationSession, IdentityError> {
        self.sessions.get(session_id)?;
        let id_number = normalize_id_number(id_number)?;
        self.otp.send(OtpChannel::NationalId, &id_number).await?;

        self.sessions.modify(session_id, |s| {
            if s.id_number.as_deref() != Some(id_number.as_str()) {
                s.id_verified = false;
            }
            s.id_number = Some(id_number);
            s.id_otp_sent = true;
        })
    }

    pub async fn verify_phone_otp(
        &self,
        session_id: &str,
        code: &str,
    ) -> Result<VerificationSession, IdentityError> {
        let session = self.sessions.get(session_id)?;
        let code = check_otp(code)?;
        let phone = session
            .phone_number
            .filter(|_| session.phone_otp_sent)
            .ok_or(IdentityError::Invalid(MSG_REQUEST_OTP_FIRST))?;

        let accepted = self.otp.verify(OtpChannel::Phone, &phone, code).await?;
        metrics::record_otp_attempt(OtpChannel::Phone.as_str(), accepted);
        if !accepted {
            return Err(IdentityError::Invalid(MSG_PHONE_OTP_INVALID));
        }
        self.sessions.modify(session_id, |s| s.phone_verified = true)
    }

    pub async fn verify_id_otp(
        &self,
        session_id: &str,
        code: &str,
    ) -> Result<VerificationSession, IdentityError> {
        let session = self.sessions.get(session_id)?;
        let code = check_otp(code)?;
        let id_number = session
            .id_number
            .filter(|_| session.id_otp_sent)
            .ok_or(IdentityError::Invalid(MSG_REQUEST_OTP_FIRST))?;

        let accepted = self.otp.verify(OtpChannel::NationalId, &id_number, code).await?;
        metrics::record_otp_attempt(OtpChannel::NationalId.as_str(), accepted);
        if !accepted {
            return Err(IdentityError::Invalid(MSG_ID_OTP_INVALID));
        }
        self.sessions.modify(session_id, |s| s.id_verified = true)
    }

    /// Register the verified visitor, reusing an existing user with the
    /// same ID number. The session is closed on success.
    pub async fn complete(
        &self,
        session_id: &str,
        full_name: &str,
    ) -> Result<CompletedVerification, IdentityError> {
        let session = self.sessions.get(session_id)?;
        let full_name = check_full_name(full_name)?;
        let phone = session
            .phone_number
            .as_deref()
            .filter(|_| session.phone_verified)
            .ok_or(IdentityError::Invalid(MSG_PHONE_NOT_VERIFIED))?;
        let id_number = session
            .id_number
            .as_deref()
            .filter(|_| session.id_verified)
            .ok_or(IdentityError::Invalid(MSG_ID_NOT_VERIFIED))?;

        let existing = self
            .store
            .find_eq(collections::USERS, "idNumber", &Value::from(id_number), Some(1))
            .await?;

        let outcome = match existing.into_iter().next() {
            Some(user) => CompletedVerification {
                user_id: user.key,
                created: false,
            },
            None => {
                let record = NewUser {
                    full_name,
                    phone_number: phone,
                    id_number,
                    phone_verified: true,
                    id_verified: true,
                    created_at: Utc::now(),
                };
                let key = self
                    .store
                    .insert(collections::USERS, to_document(&record)?)
                    .await?;
                CompletedVerification {
                    user_id: key,
                    created: true,
                }
            }
        };

        self.sessions.remove(session_id);
        tracing::info!(
            user_id = %outcome.user_id,
            created = outcome.created,
            "Identity verification completed"
        );
        Ok(outcome)
    }
}
