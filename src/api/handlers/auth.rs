//! Auth handlers and the bearer-token middleware.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, LoginResponse, MessageResponse};
use crate::app_state::AppState;
use crate::error::{BackofficeError, ErrorResponse};

fn bearer_token(headers: &HeaderMap) -> Result<String, BackofficeError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or(BackofficeError::Unauthorized)
}

/// Middleware guarding everything behind the login wall. Resolves the
/// bearer token and stores the operator identity as an extension.
///
/// # Errors
///
/// Returns [`BackofficeError::Unauthorized`] for a missing or unknown
/// token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackofficeError> {
    let token = bearer_token(request.headers())?;
    let identity = state.gate.authenticate(&token)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// `POST /auth/login` — Verify operator credentials.
///
/// # Errors
///
/// Returns [`BackofficeError::InvalidCredentials`] for a bad pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Operator sign-in",
    description = "Verifies the operator credential pair and issues a bearer token for the REST surface and socket attachment.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, BackofficeError> {
    let token = state.gate.login(&req.email, &req.password).await?;
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token,
            email: req.email,
        }),
    ))
}

/// `POST /auth/logout` — Revoke the presented bearer token.
///
/// # Errors
///
/// Returns [`BackofficeError::Unauthorized`] when no token is
/// presented.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Operator sign-out",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, BackofficeError> {
    let token = bearer_token(&headers)?;
    state.gate.logout(&token);
    Ok((StatusCode::OK, Json(MessageResponse::new("signed out"))))
}

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Routes requiring a session.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}
