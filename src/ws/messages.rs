//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TransactionStatus;
use crate::error::BackofficeError;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for commands; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message with a fresh id.
    #[must_use]
    pub fn server(msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds a response correlated to a client command id.
    #[must_use]
    pub fn response(command_id: &str, payload: serde_json::Value) -> Self {
        Self {
            id: command_id.to_string(),
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error correlated to a client command id.
    #[must_use]
    pub fn error(command_id: &str, err: &BackofficeError) -> Self {
        Self {
            id: command_id.to_string(),
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": err.error_code(),
                "message": err.to_string(),
            }),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client push event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands a client can send over the socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Start a live view over a collection. `transactions` opens the
    /// paged console view; other collections stream full snapshots.
    OpenView {
        /// Collection name.
        collection: String,
    },
    /// Tear a live view down and release its mirrors.
    CloseView {
        /// Collection name.
        collection: String,
    },
    /// Navigate the transactions console (`first`, `next`,
    /// `previous`, `last`). Requires an open transactions view.
    Page {
        /// Navigation action.
        action: String,
    },
    /// Settle a transaction from the open transactions view.
    Settle {
        /// Transaction id as shown in the view.
        transaction_id: String,
        /// `approved`, `rejected`, or `pending` (reset).
        decision: String,
    },
}

/// Parses a settlement decision string.
///
/// # Errors
///
/// Returns [`BackofficeError::Validation`] for an unknown decision.
pub fn parse_decision(raw: &str) -> Result<TransactionStatus, BackofficeError> {
    match raw {
        "pending" => Ok(TransactionStatus::Pending),
        "approved" => Ok(TransactionStatus::Approved),
        "rejected" => Ok(TransactionStatus::Rejected),
        other => Err(BackofficeError::Validation(format!(
            "unknown decision '{other}'"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn commands_decode_from_tagged_json() {
        let json = serde_json::json!({
            "command": "settle",
            "transaction_id": "t1",
            "decision": "approved",
        });
        let cmd: Option<WsCommand> = serde_json::from_value(json).ok();
        let Some(WsCommand::Settle {
            transaction_id,
            decision,
        }) = cmd
        else {
            panic!("expected a settle command");
        };
        assert_eq!(transaction_id, "t1");
        assert_eq!(decision, "approved");
    }

    #[test]
    fn unknown_decisions_are_rejected() {
        assert!(parse_decision("maybe").is_err());
        assert!(matches!(
            parse_decision("pending"),
            Ok(TransactionStatus::Pending)
        ));
    }
}
