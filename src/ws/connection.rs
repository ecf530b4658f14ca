//! WebSocket connection state machine.
//!
//! Each connection owns its views outright: collection mirrors run as
//! per-view tasks feeding one outbound channel, and the transactions
//! console (mirrors, pager, settlement entry point) lives directly in
//! the connection loop. Closing a view, or the connection itself,
//! releases everything it held.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::messages::{WsCommand, WsMessage, WsMessageType, parse_decision};
use crate::app_state::AppState;
use crate::domain::{DocId, collections};
use crate::error::BackofficeError;
use crate::service::{LiveMirror, TransactionRow, TransactionsView};
use crate::store::Query;

/// Collections that may be opened as plain snapshot views.
const SNAPSHOT_COLLECTIONS: &[&str] = &[
    collections::USERS,
    collections::TOURNAMENTS,
    collections::CATEGORIES,
    collections::FEEDBACK,
    collections::MORE_SCREEN,
];

/// Per-view mirror tasks owned by one connection.
struct ViewSet {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl ViewSet {
    fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    fn is_open(&self, collection: &str) -> bool {
        self.tasks.contains_key(collection)
    }

    fn insert(&mut self, collection: String, task: JoinHandle<()>) {
        self.tasks.insert(collection, task);
    }

    fn close(&mut self, collection: &str) {
        if let Some(task) = self.tasks.remove(collection) {
            task.abort();
        }
    }
}

impl Drop for ViewSet {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}

/// Runs the read/write loop for a single authenticated connection.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<WsMessage>(64);
    let mut views = ViewSet::new();
    let mut console: Option<TransactionsView> = None;
    let mut auth_state = state.gate.subscribe();
    let mut notifier_status = Some(state.notifier_status.clone());

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(
                            &text,
                            &state,
                            &mut views,
                            &mut console,
                            &out_tx,
                        )
                        .await;
                        if send(&mut ws_tx, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Snapshot event from one of the per-view mirror tasks
            Some(event) = out_rx.recv() => {
                if send(&mut ws_tx, &event).await.is_err() {
                    break;
                }
            }
            // Live update on the transactions console
            rows = console_changed(&mut console) => {
                match rows {
                    Some(rows) => {
                        let event = WsMessage::server(
                            WsMessageType::Event,
                            json!({ "collection": collections::TRANSACTIONS, "rows": rows }),
                        );
                        if send(&mut ws_tx, &event).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        // Mirrors are gone; the view cannot recover.
                        console = None;
                    }
                }
            }
            // Feedback delivery status change from the bridge
            status = notifier_changed(&mut notifier_status) => {
                match status {
                    Some(status) => {
                        let event = WsMessage::server(
                            WsMessageType::Event,
                            json!({ "notifierStatus": status }),
                        );
                        if send(&mut ws_tx, &event).await.is_err() {
                            break;
                        }
                    }
                    // Bridge gone; stop watching.
                    None => notifier_status = None,
                }
            }
            // Auth state change (sign-in / sign-out elsewhere)
            changed = auth_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = auth_state.borrow_and_update().clone();
                let event = WsMessage::server(
                    WsMessageType::Event,
                    json!({ "authState": snapshot }),
                );
                if send(&mut ws_tx, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

async fn send(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    msg: &WsMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).unwrap_or_default();
    ws_tx.send(Message::text(json)).await
}

async fn console_changed(console: &mut Option<TransactionsView>) -> Option<Vec<TransactionRow>> {
    match console.as_mut() {
        Some(view) => view.changed().await,
        None => std::future::pending().await,
    }
}

async fn notifier_changed(
    status: &mut Option<tokio::sync::watch::Receiver<Option<String>>>,
) -> Option<Option<String>> {
    match status.as_mut() {
        Some(watch) => match watch.changed().await {
            Ok(()) => Some(watch.borrow_and_update().clone()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

/// Parses one client frame and applies the command it carries.
async fn handle_text_message(
    text: &str,
    state: &AppState,
    views: &mut ViewSet,
    console: &mut Option<TransactionsView>,
    out_tx: &mpsc::Sender<WsMessage>,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(
            "",
            &BackofficeError::Validation("malformed JSON".to_string()),
        );
    };
    let command = match serde_json::from_value::<WsCommand>(msg.payload.clone()) {
        Ok(command) => command,
        Err(err) => {
            return WsMessage::error(&msg.id, &BackofficeError::Validation(err.to_string()));
        }
    };
    match apply_command(command, state, views, console, out_tx).await {
        Ok(payload) => WsMessage::response(&msg.id, payload),
        Err(err) => WsMessage::error(&msg.id, &err),
    }
}

async fn apply_command(
    command: WsCommand,
    state: &AppState,
    views: &mut ViewSet,
    console: &mut Option<TransactionsView>,
    out_tx: &mpsc::Sender<WsMessage>,
) -> Result<serde_json::Value, BackofficeError> {
    match command {
        WsCommand::OpenView { collection } => {
            if collection == collections::TRANSACTIONS {
                if console.is_some() {
                    return Err(BackofficeError::Validation(
                        "transactions view already open".to_string(),
                    ));
                }
                *console = Some(TransactionsView::open(
                    &state.store,
                    state.settlement.clone(),
                    state.page_size,
                )?);
            } else {
                if !SNAPSHOT_COLLECTIONS.contains(&collection.as_str()) {
                    return Err(BackofficeError::Validation(format!(
                        "unknown collection '{collection}'"
                    )));
                }
                if views.is_open(&collection) {
                    return Err(BackofficeError::Validation(format!(
                        "view '{collection}' already open"
                    )));
                }
                let task = spawn_snapshot_view(state, collection.clone(), out_tx.clone());
                views.insert(collection.clone(), task);
            }
            Ok(json!({ "opened": collection }))
        }
        WsCommand::CloseView { collection } => {
            if collection == collections::TRANSACTIONS {
                *console = None;
            } else {
                views.close(&collection);
            }
            Ok(json!({ "closed": collection }))
        }
        WsCommand::Page { action } => {
            let Some(view) = console.as_mut() else {
                return Err(BackofficeError::Validation(
                    "transactions view not open".to_string(),
                ));
            };
            let page = match action.as_str() {
                "first" => Some(view.first_page().await?),
                "last" => Some(view.last_page().await?),
                "next" => view.next_page().await?,
                "previous" => view.previous_page().await?,
                other => {
                    return Err(BackofficeError::Validation(format!(
                        "unknown page action '{other}'"
                    )));
                }
            };
            match page {
                Some(page) => serde_json::to_value(page)
                    .map_err(|e| BackofficeError::Internal(e.to_string())),
                None => Ok(serde_json::Value::Null),
            }
        }
        WsCommand::Settle {
            transaction_id,
            decision,
        } => {
            let Some(view) = console.as_ref() else {
                return Err(BackofficeError::Validation(
                    "transactions view not open".to_string(),
                ));
            };
            let decision = parse_decision(&decision)?;
            view.settle(&DocId::new(transaction_id.clone()), decision)
                .await?;
            Ok(json!({ "settled": transaction_id, "status": decision.as_str() }))
        }
    }
}

/// Spawns the mirror task behind one snapshot view. The task pushes a
/// full-snapshot event per change and exits when the view closes or
/// the subscription dies.
fn spawn_snapshot_view(
    state: &AppState,
    collection: String,
    out_tx: mpsc::Sender<WsMessage>,
) -> JoinHandle<()> {
    let mut mirror: LiveMirror<serde_json::Value> =
        LiveMirror::open(&state.store, Query::collection(&collection));
    tokio::spawn(async move {
        while let Some(snapshot) = mirror.changed().await {
            if let Some(error) = snapshot.error {
                let event = WsMessage::server(
                    WsMessageType::Error,
                    json!({ "collection": collection, "message": error }),
                );
                let _ = out_tx.send(event).await;
                break;
            }
            let event = WsMessage::server(
                WsMessageType::Event,
                json!({ "collection": collection, "docs": snapshot.docs }),
            );
            if out_tx.send(event).await.is_err() {
                break;
            }
        }
    })
}
