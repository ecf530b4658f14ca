//! Transaction listing DTOs.
//!
//! The REST surface only reads transactions; settlement happens on the
//! socket, against the connection's own live view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::BackofficeError;
use crate::service::TransactionRow;

/// Query parameters for `GET /transactions`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TransactionListParams {
    /// Optional status filter (`pending`, `approved`, `rejected`).
    #[serde(default)]
    pub status: Option<String>,
    /// Maximum rows to return. Defaults to 50, capped at 200.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl TransactionListParams {
    /// Effective row cap.
    #[must_use]
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }

    /// Validates the status filter, if present.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] for an unknown status.
    pub fn status_filter(&self) -> Result<Option<&str>, BackofficeError> {
        match self.status.as_deref() {
            None => Ok(None),
            Some(s @ ("pending" | "approved" | "rejected")) => Ok(Some(s)),
            Some(other) => Err(BackofficeError::Validation(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}

/// One transaction joined with its owner's identity.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRowDto {
    /// Transaction id.
    pub id: String,
    /// `deposit` or `withdraw`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Amount in coins.
    pub amount: i64,
    /// Owning user id.
    pub user_id: String,
    /// Owner's in-game name, `"Unknown"` when the user is missing.
    pub in_game_name: String,
    /// Owner's email, `"Unknown"` when the user is missing.
    pub email: String,
    /// Settlement status.
    pub status: String,
    /// Payment proof image URL, for deposits.
    pub proof: Option<String>,
    /// Withdrawal destination account number.
    pub account_number: Option<String>,
    /// Withdrawal account type.
    pub account_type: Option<String>,
    /// Withdrawal account holder name.
    pub account_name: Option<String>,
    /// Creation timestamp.
    pub timestamp: Option<DateTime<Utc>>,
    /// Last settlement action timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&TransactionRow> for TransactionRowDto {
    fn from(row: &TransactionRow) -> Self {
        let t = &row.transaction;
        Self {
            id: t.id.to_string(),
            kind: match t.kind {
                crate::domain::TransactionType::Deposit => "deposit".to_string(),
                crate::domain::TransactionType::Withdraw => "withdraw".to_string(),
            },
            amount: t.amount,
            user_id: t.user_id.to_string(),
            in_game_name: row.in_game_name.clone(),
            email: row.email.clone(),
            status: t.status.as_str().to_string(),
            proof: t.proof.clone(),
            account_number: t.account_number.clone(),
            account_type: t.account_type.clone(),
            account_name: t.account_name.clone(),
            timestamp: t.timestamp,
            updated_at: t.updated_at,
        }
    }
}
