//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`. Everything except
//! `/auth/login` and `/health` sits behind the bearer-token
//! middleware.

pub mod dto;
pub mod handlers;

use axum::{Router, middleware};

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router(state: &AppState) -> Router<AppState> {
    let protected = handlers::routes().layer(middleware::from_fn_with_state(
        state.clone(),
        handlers::auth::require_auth,
    ));
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(handlers::auth::public_routes())
                .merge(protected),
        )
        .merge(handlers::system::routes())
}
