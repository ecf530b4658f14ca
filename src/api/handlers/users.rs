//! User roster handlers: list, status toggle, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};

use crate::api::dto::{MessageResponse, UserDto, UserListParams, UserStatusRequest};
use crate::app_state::AppState;
use crate::domain::{User, collections};
use crate::error::{BackofficeError, ErrorResponse};
use crate::service::search_users;
use crate::store::decode_all;

/// `GET /users` — List the roster, optionally filtered by a search
/// term.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List users",
    params(UserListParams),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserDto>),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, BackofficeError> {
    let docs = state
        .store
        .get_once(&crate::store::Query::collection(collections::USERS))
        .await?;
    let users: Vec<User> = decode_all(&docs);
    let term = params.search.unwrap_or_default();
    let matched: Vec<UserDto> = search_users(&users, &term)
        .into_iter()
        .map(UserDto::from)
        .collect();
    Ok((StatusCode::OK, Json(matched)))
}

/// `PATCH /users/{id}/status` — Activate or deactivate an account.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown user.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/status",
    tag = "Users",
    summary = "Set a user's active flag",
    request_body = UserStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
    )
)]
pub async fn set_user_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UserStatusRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.roster.set_active(&id, req.active).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("status updated"))))
}

/// `DELETE /users/{id}` — Remove a user account.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Delete a user",
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.roster.delete(&id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("user deleted"))))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/status", patch(set_user_status))
        .route("/users/{id}", delete(delete_user))
}
