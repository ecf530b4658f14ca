//! Back-office error types with HTTP status code mapping.
//!
//! [`BackofficeError`] is the central error type for the gateway. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. Nothing here retries: every failure is terminal for its
//! attempt and requires a fresh operator action.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "document not found: transactions/t1",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`BackofficeError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                  |
/// |-----------|---------------------|------------------------------|
/// | 1000–1999 | Validation / Auth   | 400 / 401                    |
/// | 2000–2999 | State / Not Found   | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Store / Server      | 500 Internal Server Error    |
/// | 4000–4999 | Outbound boundaries | 502 Bad Gateway              |
#[derive(Debug, thiserror::Error)]
pub enum BackofficeError {
    /// Login rejected by the auth provider.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Request carried no valid session token.
    #[error("missing or invalid session")]
    Unauthorized,

    /// Request or document failed boundary validation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Document lookup failed (store or local mirror).
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection the lookup ran against.
        collection: String,
        /// Document key that was not found.
        id: String,
    },

    /// Settlement attempted a transition the workflow does not permit.
    #[error("settlement transition not permitted: {from} -> {to}")]
    InvalidTransition {
        /// Status the transaction currently holds.
        from: String,
        /// Status the operator requested.
        to: String,
    },

    /// A settlement for this transaction is already in flight.
    #[error("settlement already in flight for transaction {0}")]
    SettlementInFlight(String),

    /// Store listener failed; the mirror was emptied and will not reconnect.
    #[error("subscription failed: {0}")]
    Subscription(String),

    /// Single document write failed.
    #[error("write failed: {0}")]
    Write(String),

    /// Image upload failed; the enclosing save was aborted.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Outbound notification failed (non-fatal, logged).
    #[error("notification failed: {0}")]
    Notification(String),

    /// Store query or connection failure.
    #[error("store error: {0}")]
    Store(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BackofficeError {
    /// Convenience constructor for [`BackofficeError::NotFound`].
    #[must_use]
    pub fn not_found(collection: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.into(),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidCredentials => 1101,
            Self::Unauthorized => 1102,
            Self::NotFound { .. } => 2001,
            Self::InvalidTransition { .. } => 2101,
            Self::SettlementInFlight(_) => 2102,
            Self::Store(_) => 3001,
            Self::Subscription(_) => 3002,
            Self::Write(_) => 3003,
            Self::Internal(_) => 3000,
            Self::Upload(_) => 4001,
            Self::Notification(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } | Self::SettlementInFlight(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Subscription(_) | Self::Write(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upload(_) | Self::Notification(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for BackofficeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = BackofficeError::not_found("transactions", "t1");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.to_string(), "document not found: transactions/t1");
    }

    #[test]
    fn auth_errors_map_to_401() {
        assert_eq!(
            BackofficeError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackofficeError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn settlement_conflicts_map_to_409() {
        let err = BackofficeError::InvalidTransition {
            from: "approved".to_string(),
            to: "approved".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            BackofficeError::SettlementInFlight("t1".to_string()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn outbound_errors_map_to_502() {
        assert_eq!(
            BackofficeError::Upload("timeout".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            BackofficeError::Notification("provider 500".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
