//! Identity verification routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::identity::{CompletedVerification, VerificationSession};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneBody {
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdNumberBody {
    #[serde(default)]
    pub id_number: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpBody {
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    #[serde(default)]
    pub full_name: String,
}

pub async fn start_session(State(state): State<AppState>) -> (StatusCode, Json<VerificationSession>) {
    (StatusCode::CREATED, Json(state.services().identity.start_session()))
}

pub async fn send_phone_otp(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<PhoneBody>,
) -> Result<Json<VerificationSession>, ApiError> {
    let session = state
        .services()
        .identity
        .send_phone_otp(&session_id, &body.phone_number)
        .await?;
    Ok(Json(session))
}

pub async fn verify_phone_otp(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<OtpBody>,
) -> Result<Json<VerificationSession>, ApiError> {
    let session = state
        .services()
        .identity
        .verify_phone_otp(&session_id, &body.otp)
        .await?;
    Ok(Json(session))
}

pub async fn send_id_otp(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<IdNumberBody>,
) -> Result<Json<VerificationSession>, ApiError> {
    let session = state
        .services()
        .identity
        .send_id_otp(&session_id, &body.id_number)
        .await?;
    Ok(Json(session))
}

pub async fn verify_id_otp(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<OtpBody>,
) -> Result<Json<VerificationSession>, ApiError> {
    let session = state
        .services()
        .identity
        .verify_id_otp(&session_id, &body.otp)
        .await?;
    Ok(Json(session))
}

pub async fn complete(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<CompleteBody>,
) -> Result<Json<CompletedVerification>, ApiError> {
    let completed = state
        .services()
        .identity
        .complete(&session_id, &body.full_name)
        .await?;
    Ok(Json(completed))
}
