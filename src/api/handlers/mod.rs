//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod feedback;
pub mod more_screen;
pub mod system;
pub mod tournaments;
pub mod transactions;
pub mod uploads;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes the session-protected resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(tournaments::routes())
        .merge(transactions::routes())
        .merge(more_screen::routes())
        .merge(feedback::routes())
        .merge(uploads::routes())
}
