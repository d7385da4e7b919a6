//! Listing routes.

use std::str::FromStr;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::listings::{ImageUpload, PropertyStatus, PropertySubmission, PropertyView};

/// Multipart field carrying the listing image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PropertyView>>, ApiError> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(PropertyStatus::from_str(raw)?),
        None => None,
    };
    let properties = state.services().listings.list_properties(status).await?;
    Ok(Json(properties))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<PropertyView>, ApiError> {
    Ok(Json(state.services().listings.get_property(&key).await?))
}

pub async fn submit_property(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PropertyView>), ApiError> {
    let (submission, image) = read_submission(multipart).await?;
    let view = state
        .services()
        .listings
        .submit_property(submission, image)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Split the form into its text fields and the optional image.
///
/// A file part with no name and no bytes is what browsers send for an
/// empty file input, so it counts as no image.
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(PropertySubmission, Option<ImageUpload>), ApiError> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            if !(file_name.is_empty() && bytes.is_empty()) {
                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            fields.insert(name, Value::String(text));
        }
    }

    let submission: PropertySubmission = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok((submission, image))
}
