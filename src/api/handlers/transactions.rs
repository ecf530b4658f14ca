//! Read-only transaction listing.
//!
//! Settlement is deliberately absent here: it runs on the socket,
//! against the connection's own live view, so the operator always acts
//! on the rows they are looking at.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{TransactionListParams, TransactionRowDto};
use crate::app_state::AppState;
use crate::domain::{Transaction, User, collections};
use crate::error::{BackofficeError, ErrorResponse};
use crate::service::join_rows;
use crate::store::{Direction, decode_all};

/// `GET /transactions` — One-shot transaction listing, newest first,
/// joined with owner identities.
///
/// # Errors
///
/// Returns [`BackofficeError::Validation`] for an unknown status
/// filter, store errors otherwise.
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    tag = "Transactions",
    summary = "List transactions",
    params(TransactionListParams),
    responses(
        (status = 200, description = "Joined transaction rows", body = Vec<TransactionRowDto>),
        (status = 400, description = "Bad filter", body = ErrorResponse),
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionListParams>,
) -> Result<impl IntoResponse, BackofficeError> {
    let mut query = crate::store::Query::collection(collections::TRANSACTIONS)
        .order_by("timestamp", Direction::Descending)
        .limit(params.effective_limit());
    if let Some(status) = params.status_filter()? {
        query = query.filter_eq("status", serde_json::json!(status));
    }

    let docs = state.store.get_once(&query).await?;
    let transactions: Vec<Transaction> = decode_all(&docs);

    let user_docs = state
        .store
        .get_once(&crate::store::Query::collection(collections::USERS))
        .await?;
    let users: Vec<User> = decode_all(&user_docs);

    let rows: Vec<TransactionRowDto> = join_rows(&transactions, &users)
        .iter()
        .map(TransactionRowDto::from)
        .collect();
    Ok((StatusCode::OK, Json(rows)))
}

/// Transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transactions", get(list_transactions))
}
