//! WebSocket upgrade endpoint.

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;

/// Query parameters for the socket upgrade. Browsers cannot set
/// headers on WebSocket requests, so the bearer token rides the query
/// string.
#[derive(Debug, Deserialize)]
pub struct WsAuthParams {
    /// Bearer token from `POST /auth/login`.
    pub token: String,
}

/// `GET /ws` — Upgrade to the live console socket.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsAuthParams>,
    ws: WebSocketUpgrade,
) -> Response {
    match state.gate.authenticate(&params.token) {
        Ok(_) => ws
            .on_upgrade(move |socket| run_connection(socket, state))
            .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Socket routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}
