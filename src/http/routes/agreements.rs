//! Agreement draft routes.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::agreement::document::document_file_name;
use crate::agreement::{AgreementDraft, DraftPatch, GeneratedTransaction, Party, VerificationResult};
use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDraftBody {
    #[serde(default)]
    pub property_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignBody {
    pub party: Party,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBody {
    #[serde(default)]
    pub transaction_id: String,
}

pub async fn open_draft(
    State(state): State<AppState>,
    Json(body): Json<OpenDraftBody>,
) -> Result<(StatusCode, Json<AgreementDraft>), ApiError> {
    let draft = state
        .services()
        .agreements
        .open_draft(body.property_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

pub async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgreementDraft>, ApiError> {
    Ok(Json(state.services().agreements.get_draft(&id)?))
}

pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<DraftPatch>,
) -> Result<Json<AgreementDraft>, ApiError> {
    Ok(Json(state.services().agreements.update_draft(&id, patch)?))
}

pub async fn sign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SignBody>,
) -> Result<Json<AgreementDraft>, ApiError> {
    Ok(Json(state.services().agreements.sign(&id, body.party)?))
}

pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GeneratedTransaction>, ApiError> {
    Ok(Json(state.services().agreements.generate(&id).await?))
}

/// Plain-text agreement served as a download.
pub async fn document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (draft, text) = state.services().agreements.render_document(&id)?;
    let disposition = format!("attachment; filename=\"{}\"", document_file_name(&draft));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        text,
    ))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> Json<VerificationResult> {
    Json(state.services().agreements.verify(&body.transaction_id).await)
}
