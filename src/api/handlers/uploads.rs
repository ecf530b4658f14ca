//! Image upload handler.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::{BackofficeError, ErrorResponse};

/// Upload result.
#[derive(Debug, Serialize, ToSchema)]
struct UploadResponse {
    /// Secure URL of the hosted image; store this in documents.
    url: String,
}

/// `POST /uploads` — Forward one image to the external host and
/// return its secure URL. Expects a multipart body with a `file`
/// field.
///
/// # Errors
///
/// Returns [`BackofficeError::Validation`] when the `file` field is
/// missing, [`BackofficeError::Upload`] when the host rejects it.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "Uploads",
    summary = "Upload an image",
    responses(
        (status = 200, description = "Image hosted", body = UploadResponse),
        (status = 400, description = "No file field", body = ErrorResponse),
        (status = 502, description = "Image host failure", body = ErrorResponse),
    )
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, BackofficeError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BackofficeError::Validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| BackofficeError::Validation(e.to_string()))?;

        let url = state
            .uploader
            .upload(&file_name, &content_type, bytes.to_vec())
            .await?;
        return Ok((StatusCode::OK, Json(UploadResponse { url })));
    }
    Err(BackofficeError::Validation(
        "multipart body must carry a 'file' field".to_string(),
    ))
}

/// Upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/uploads", post(upload_image))
}
