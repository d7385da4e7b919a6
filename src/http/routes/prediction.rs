//! Price prediction routes.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::prediction::{Prediction, PredictionForm};

pub async fn predict(
    State(state): State<AppState>,
    Json(form): Json<PredictionForm>,
) -> Result<Json<Prediction>, ApiError> {
    Ok(Json(state.services().prediction.predict(&form).await?))
}

/// `POST /predict`: hand the body to the model server untouched.
pub async fn passthrough(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match state.services().prediction.forward(body, content_type).await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut response = (status, upstream.body).into_response();
            if let Some(value) = upstream
                .content_type
                .and_then(|ct| header::HeaderValue::from_str(&ct).ok())
            {
                response.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            response
        }
        Err(e) => ApiError::upstream("Failed to reach the prediction server", e).into_response(),
    }
}
