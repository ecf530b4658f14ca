//! Feedback handlers: list, mark read, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{FeedbackDto, MessageResponse};
use crate::app_state::AppState;
use crate::domain::{Feedback, collections};
use crate::error::{BackofficeError, ErrorResponse};
use crate::store::{Direction, Query, decode_all};

/// `GET /feedback` — List submissions, newest first.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/feedback",
    tag = "Feedback",
    summary = "List feedback",
    responses(
        (status = 200, description = "All submissions", body = Vec<FeedbackDto>),
    )
)]
pub async fn list_feedback(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BackofficeError> {
    let docs = state
        .store
        .get_once(
            &Query::collection(collections::FEEDBACK)
                .order_by("timestamp", Direction::Descending),
        )
        .await?;
    let entries: Vec<Feedback> = decode_all(&docs);
    let body: Vec<FeedbackDto> = entries.iter().map(FeedbackDto::from).collect();
    Ok((StatusCode::OK, Json(body)))
}

/// `POST /feedback/{id}/read` — Mark a submission read.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown submission.
#[utoipa::path(
    post,
    path = "/api/v1/feedback/{id}/read",
    tag = "Feedback",
    summary = "Mark feedback read",
    responses(
        (status = 200, description = "Marked read", body = MessageResponse),
        (status = 404, description = "Unknown submission", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.feedback.mark_read(&id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("marked read"))))
}

/// `DELETE /feedback/{id}` — Remove a submission.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    delete,
    path = "/api/v1/feedback/{id}",
    tag = "Feedback",
    summary = "Delete feedback",
    responses(
        (status = 200, description = "Submission deleted", body = MessageResponse),
    )
)]
pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.feedback.delete(&id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("submission deleted")),
    ))
}

/// Feedback routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", get(list_feedback))
        .route("/feedback/{id}/read", post(mark_read))
        .route("/feedback/{id}", delete(delete_feedback))
}
