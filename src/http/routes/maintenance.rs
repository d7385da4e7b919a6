//! Maintenance routes and the owner e-mail route.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::maintenance::{HouseRequests, MaintenanceSubmission, OwnerEmailRequest, SubmissionOutcome};

pub async fn submit_request(
    State(state): State<AppState>,
    Json(submission): Json<MaintenanceSubmission>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), ApiError> {
    let outcome = state.services().maintenance.submit_request(submission).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn requests_for_house(
    State(state): State<AppState>,
    Path(house_id): Path<String>,
) -> Result<Json<HouseRequests>, ApiError> {
    Ok(Json(
        state.services().maintenance.requests_for_house(&house_id).await?,
    ))
}

pub async fn mark_completed(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.services().maintenance.mark_completed(&request_id).await?;
    Ok(Json(json!({ "id": request_id, "status": "Completed" })))
}

/// `POST /api/send-mtnc-to-owner`. Failures answer 500 with the cause.
pub async fn send_owner_email(
    State(state): State<AppState>,
    Json(request): Json<OwnerEmailRequest>,
) -> Response {
    match state.services().maintenance.send_owner_email(&request).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Email sent successfully" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(house_id = %request.house_id, error = %e, "Owner e-mail failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Failed to send email", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
