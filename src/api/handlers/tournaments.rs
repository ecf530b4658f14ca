//! Tournament and category handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};

use crate::api::dto::{
    CategoryDto, CategoryListParams, CreateCategoryRequest, CreateTournamentRequest,
    MessageResponse, RoomUpdateRequest, TournamentDto, TournamentListParams,
    TournamentStatusRequest,
};
use crate::app_state::AppState;
use crate::domain::{Category, Tournament, collections};
use crate::error::{BackofficeError, ErrorResponse};
use crate::service::{search_categories, search_tournaments};
use crate::store::{Direction, decode_all};

/// `GET /tournaments` — List tournaments, newest first, optionally
/// filtered by a search term.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/tournaments",
    tag = "Tournaments",
    summary = "List tournaments",
    params(TournamentListParams),
    responses(
        (status = 200, description = "Matching tournaments", body = Vec<TournamentDto>),
    )
)]
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(params): Query<TournamentListParams>,
) -> Result<impl IntoResponse, BackofficeError> {
    let docs = state
        .store
        .get_once(
            &crate::store::Query::collection(collections::TOURNAMENTS)
                .order_by("createdAt", Direction::Descending),
        )
        .await?;
    let tournaments: Vec<Tournament> = decode_all(&docs);
    let term = params.search.unwrap_or_default();
    let body: Vec<TournamentDto> = search_tournaments(&tournaments, &term)
        .into_iter()
        .map(TournamentDto::from)
        .collect();
    Ok((StatusCode::OK, Json(body)))
}

/// `POST /tournaments` — Create a tournament.
///
/// # Errors
///
/// Returns [`BackofficeError::Validation`] for an invalid draft.
#[utoipa::path(
    post,
    path = "/api/v1/tournaments",
    tag = "Tournaments",
    summary = "Create a tournament",
    request_body = CreateTournamentRequest,
    responses(
        (status = 201, description = "Tournament created", body = TournamentDto),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
    )
)]
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(req): Json<CreateTournamentRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    let created = state.tournaments.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(TournamentDto::from(&created))))
}

/// `PATCH /tournaments/{id}/room` — Publish room credentials.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown tournament.
#[utoipa::path(
    patch,
    path = "/api/v1/tournaments/{id}/room",
    tag = "Tournaments",
    summary = "Set room id and password",
    request_body = RoomUpdateRequest,
    responses(
        (status = 200, description = "Room updated", body = MessageResponse),
        (status = 404, description = "Unknown tournament", body = ErrorResponse),
    )
)]
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RoomUpdateRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    state
        .tournaments
        .update_room(&id, &req.room_id, &req.pass)
        .await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("room updated"))))
}

/// `PATCH /tournaments/{id}/status` — Show or hide a tournament.
///
/// # Errors
///
/// Returns [`BackofficeError::NotFound`] for an unknown tournament.
#[utoipa::path(
    patch,
    path = "/api/v1/tournaments/{id}/status",
    tag = "Tournaments",
    summary = "Set a tournament's visibility",
    request_body = TournamentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 404, description = "Unknown tournament", body = ErrorResponse),
    )
)]
pub async fn set_tournament_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TournamentStatusRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.tournaments.set_active(&id, req.active).await?;
    Ok((StatusCode::OK, Json(MessageResponse::new("status updated"))))
}

/// `DELETE /tournaments/{id}` — Remove a tournament.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    delete,
    path = "/api/v1/tournaments/{id}",
    tag = "Tournaments",
    summary = "Delete a tournament",
    responses(
        (status = 200, description = "Tournament deleted", body = MessageResponse),
    )
)]
pub async fn delete_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.tournaments.delete(&id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("tournament deleted")),
    ))
}

/// `GET /categories` — List the category catalog, optionally filtered
/// by a search term.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Tournaments",
    summary = "List categories",
    params(CategoryListParams),
    responses(
        (status = 200, description = "Matching categories", body = Vec<CategoryDto>),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<CategoryListParams>,
) -> Result<impl IntoResponse, BackofficeError> {
    let docs = state
        .store
        .get_once(&crate::store::Query::collection(collections::CATEGORIES))
        .await?;
    let categories: Vec<Category> = decode_all(&docs);
    let term = params.search.unwrap_or_default();
    let body: Vec<CategoryDto> = search_categories(&categories, &term)
        .into_iter()
        .map(CategoryDto::from)
        .collect();
    Ok((StatusCode::OK, Json(body)))
}

/// `POST /categories` — Create a category.
///
/// # Errors
///
/// Returns [`BackofficeError::Validation`] for a blank name.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "Tournaments",
    summary = "Create a category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    let created = state.tournaments.create_category(req.into()).await?;
    Ok((StatusCode::CREATED, Json(CategoryDto::from(&created))))
}

/// `DELETE /categories/{id}` — Remove a category.
///
/// # Errors
///
/// Returns [`BackofficeError`] on store failures.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "Tournaments",
    summary = "Delete a category",
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BackofficeError> {
    state.tournaments.delete_category(&id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("category deleted")),
    ))
}

/// Tournament and category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tournaments", get(list_tournaments).post(create_tournament))
        .route("/tournaments/{id}/room", patch(update_room))
        .route("/tournaments/{id}/status", patch(set_tournament_status))
        .route("/tournaments/{id}", delete(delete_tournament))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
}
