//! Error responses.
//!
//! Every module error maps onto one of three shapes:
//! - validation failures: 400 `{message}`
//! - missing records: 404 `{message}`
//! - failed external calls: 502 `{message, error}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::agreement::AgreementError;
use crate::identity::IdentityError;
use crate::listings::ListingError;
use crate::maintenance::MaintenanceError;
use crate::prediction::PredictionError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Upstream { message: String, error: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn upstream(message: impl Into<String>, error: impl ToString) -> Self {
        Self::Upstream {
            message: message.into(),
            error: error.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(message) | Self::NotFound(message) => json!({ "message": message }),
            Self::Upstream { message, error } => {
                tracing::error!(error = %error, "{message}");
                json!({ "message": message, "error": error })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<ListingError> for ApiError {
    fn from(e: ListingError) -> Self {
        match e {
            ListingError::Invalid(message) => Self::bad_request(message),
            ListingError::NotFound => Self::NotFound(e.to_string()),
            ListingError::Upload(ref source) | ListingError::Store(ref source) => {
                Self::upstream(e.to_string(), source)
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Invalid(message) => Self::bad_request(message),
            IdentityError::SessionNotFound => Self::NotFound(e.to_string()),
            IdentityError::Delivery(ref reason) => Self::upstream("Failed to send OTP. Please try again.", reason),
            IdentityError::Store(ref source) => Self::upstream(e.to_string(), source),
        }
    }
}

impl From<MaintenanceError> for ApiError {
    fn from(e: MaintenanceError) -> Self {
        match e {
            MaintenanceError::Invalid(message) => Self::bad_request(message),
            MaintenanceError::PropertyNotFound(message) => Self::NotFound(message.to_string()),
            MaintenanceError::RequestNotFound => Self::NotFound(e.to_string()),
            MaintenanceError::Store(ref source) => Self::upstream(e.to_string(), source),
        }
    }
}

impl From<AgreementError> for ApiError {
    fn from(e: AgreementError) -> Self {
        match e {
            AgreementError::Invalid(message) => Self::bad_request(message),
            AgreementError::DraftNotFound | AgreementError::PropertyNotFound => {
                Self::NotFound(e.to_string())
            }
            AgreementError::Store(_) | AgreementError::Chain(_) | AgreementError::Encoding(_) => {
                Self::upstream("Failed to process the agreement. Please try again.", e)
            }
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(e: PredictionError) -> Self {
        match e {
            PredictionError::Invalid(message) => Self::BadRequest(message),
            other => Self::upstream("Failed to get a price prediction", other),
        }
    }
}
