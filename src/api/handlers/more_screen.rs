//! More-screen menu handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    MenuItemDto, MenuItemRequest, MenuListResponse, MessageResponse, MoveItemRequest,
};
use crate::app_state::AppState;
use crate::error::{BackofficeError, ErrorResponse};

/// `GET /more-screen` — The full menu list in display order.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/more-screen",
    tag = "MoreScreen",
    summary = "Get the menu list",
    responses(
        (status = 200, description = "Ordered menu items", body = MenuListResponse),
    )
)]
pub async fn get_menu(State(state): State<AppState>) -> Result<impl IntoResponse, BackofficeError> {
    let config = state.more_screen.load().await?;
    Ok((StatusCode::OK, Json(MenuListResponse::from(&config))))
}

/// `POST /more-screen/items` — Append a menu item.
///
/// # Errors
///
/// Returns [`BackofficeError::Validation`] for an invalid draft.
#[utoipa::path(
    post,
    path = "/api/v1/more-screen/items",
    tag = "MoreScreen",
    summary = "Add a menu item",
    request_body = MenuItemRequest,
    responses(
        (status = 201, description = "Item appended", body = MenuItemDto),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
    )
)]
pub async fn add_item(
    State(state): State<AppState>,
    Json(req): Json<MenuItemRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    let item = state.more_screen.add_item(req.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(MenuItemDto::from(&item))))
}

/// `PUT /more-screen/items/{id}` — Replace an item's editable fields.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown item.
#[utoipa::path(
    put,
    path = "/api/v1/more-screen/items/{id}",
    tag = "MoreScreen",
    summary = "Edit a menu item",
    request_body = MenuItemRequest,
    responses(
        (status = 200, description = "Item updated", body = MenuItemDto),
        (status = 404, description = "Unknown item", body = ErrorResponse),
    )
)]
pub async fn edit_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MenuItemRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    let item = state.more_screen.edit_item(&id, req.try_into()?).await?;
    Ok((StatusCode::OK, Json(MenuItemDto::from(&item))))
}

/// `DELETE /more-screen/items/{id}` — Remove an item and close the
/// ordering gap.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown item.
#[utoipa::path(
    delete,
    path = "/api/v1/more-screen/items/{id}",
    tag = "MoreScreen",
    summary = "Delete a menu item",
    responses(
        (status = 200, description = "Item removed", body = MessageResponse),
        (status = 404, description = "Unknown item", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.more_screen.delete_item(&id).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("item removed"))))
}

/// `POST /more-screen/items/{id}/toggle` — Flip an item's visibility.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown item.
#[utoipa::path(
    post,
    path = "/api/v1/more-screen/items/{id}/toggle",
    tag = "MoreScreen",
    summary = "Toggle item visibility",
    responses(
        (status = 200, description = "Visibility flipped", body = MenuItemDto),
        (status = 404, description = "Unknown item", body = ErrorResponse),
    )
)]
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BackofficeError> {
    let item = state.more_screen.toggle_visibility(&id).await?;
    Ok((StatusCode::OK, Json(MenuItemDto::from(&item))))
}

/// `POST /more-screen/items/{id}/move` — Swap an item with its
/// neighbor. Boundary moves succeed without changing anything.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown item,
/// [`BackofficeError::Validation`] for a bad direction.
#[utoipa::path(
    post,
    path = "/api/v1/more-screen/items/{id}/move",
    tag = "MoreScreen",
    summary = "Move a menu item",
    request_body = MoveItemRequest,
    responses(
        (status = 200, description = "Move applied", body = MessageResponse),
        (status = 404, description = "Unknown item", body = ErrorResponse),
    )
)]
pub async fn move_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveItemRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.more_screen.move_item(&id, req.parsed()?).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("move applied"))))
}

/// More-screen routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/more-screen", get(get_menu))
        .route("/more-screen/items", post(add_item))
        .route(
            "/more-screen/items/{id}",
            put(edit_item).delete(delete_item),
        )
        .route("/more-screen/items/{id}/toggle", post(toggle_item))
        .route("/more-screen/items/{id}/move", post(move_item))
}
