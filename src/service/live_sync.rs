//! Live collection sync.
//!
//! A [`LiveMirror`] keeps a typed, in-memory copy of one store query
//! continuously up to date. Every emission from the underlying
//! subscription replaces the mirror's contents wholesale; consumers
//! observe the mirror through a `tokio::sync::watch` channel, so they
//! always read the latest state and never queue behind stale snapshots.

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::store::{Query, Store, Subscription, decode_all};

/// Snapshot of a mirrored collection.
#[derive(Debug, Clone)]
pub struct MirrorState<T> {
    /// Decoded documents, in query order. Malformed documents are
    /// skipped, not fatal.
    pub docs: Vec<T>,
    /// Set once if the subscription failed; the mirror then stops
    /// updating and its document list is emptied.
    pub error: Option<String>,
}

impl<T> Default for MirrorState<T> {
    fn default() -> Self {
        Self {
            docs: Vec::new(),
            error: None,
        }
    }
}

/// A self-updating typed view over one store query.
///
/// Dropping the mirror detaches the underlying subscription.
#[derive(Debug)]
pub struct LiveMirror<T> {
    state: watch::Receiver<MirrorState<T>>,
    task: JoinHandle<()>,
}

impl<T> LiveMirror<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Opens a mirror over the given query. The initial state is empty
    /// until the subscription delivers its first snapshot.
    #[must_use]
    pub fn open(store: &Store, query: Query) -> Self {
        Self::from_subscription(store.subscribe(query))
    }

    pub(crate) fn from_subscription(mut subscription: Subscription) -> Self {
        let (tx, state) = watch::channel(MirrorState::default());
        let task = tokio::spawn(async move {
            loop {
                match subscription.recv().await {
                    Some(Ok(docs)) => {
                        tx.send_replace(MirrorState {
                            docs: decode_all(&docs),
                            error: None,
                        });
                    }
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "collection mirror stopped");
                        // Stale documents must not outlive the subscription.
                        tx.send_replace(MirrorState {
                            docs: Vec::new(),
                            error: Some(err.to_string()),
                        });
                        break;
                    }
                    None => break,
                }
            }
        });
        Self { state, task }
    }

    /// Returns a clone of the current mirror state.
    #[must_use]
    pub fn state(&self) -> MirrorState<T> {
        self.state.borrow().clone()
    }

    /// Returns a clone of the current documents.
    #[must_use]
    pub fn docs(&self) -> Vec<T> {
        self.state.borrow().docs.clone()
    }

    /// Waits until the mirror state changes, then returns the new
    /// state. Returns `None` once the mirror has shut down and no
    /// further change will come.
    pub async fn changed(&mut self) -> Option<MirrorState<T>> {
        match self.state.changed().await {
            Ok(()) => Some(self.state.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

impl<T> Drop for LiveMirror<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{Transaction, TransactionStatus, collections};

    async fn seed_transaction(store: &Store, id: &str, amount: i64, ts: &str) {
        store
            .set_doc(
                collections::TRANSACTIONS,
                id,
                json!({
                    "type": "deposit",
                    "amount": amount,
                    "userId": "u1",
                    "status": "pending",
                    "timestamp": ts,
                }),
            )
            .await
            .unwrap_or_else(|e| panic!("seed failed: {e}"));
    }

    #[tokio::test]
    async fn mirror_replaces_contents_wholesale() {
        let store = Store::memory();
        seed_transaction(&store, "t1", 100, "2026-01-01T00:00:00Z").await;

        let mut mirror: LiveMirror<Transaction> = LiveMirror::open(
            &store,
            Query::collection(collections::TRANSACTIONS).order_by(
                "timestamp",
                crate::store::Direction::Descending,
            ),
        );

        let Some(first) = mirror.changed().await else {
            panic!("mirror closed before first snapshot");
        };
        assert_eq!(first.docs.len(), 1);
        let Some(head) = first.docs.first() else {
            panic!("missing first document");
        };
        assert_eq!(head.amount, 100);
        assert_eq!(head.status, TransactionStatus::Pending);

        seed_transaction(&store, "t2", 250, "2026-01-02T00:00:00Z").await;
        let Some(second) = mirror.changed().await else {
            panic!("mirror closed before second snapshot");
        };
        assert_eq!(second.docs.len(), 2);
        assert_eq!(second.docs.first().map(|t| t.amount), Some(250), "newest first");
    }

    #[tokio::test]
    async fn mirror_reports_subscription_failure() {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let task = tokio::spawn(async {});
        let mut mirror: LiveMirror<Transaction> =
            LiveMirror::from_subscription(Subscription::new(rx, task));

        let doc = crate::store::Document::new(
            "t1",
            json!({
                "type": "deposit",
                "amount": 100,
                "userId": "u1",
                "status": "pending",
            }),
        );
        let Ok(()) = tx.send(Ok(vec![doc])).await else {
            panic!("mirror dropped its receiver");
        };
        let Some(snapshot) = mirror.changed().await else {
            panic!("expected a snapshot before the failure");
        };
        assert_eq!(snapshot.docs.len(), 1);

        let Ok(()) = tx
            .send(Err(crate::error::BackofficeError::Subscription(
                "backend gone".into(),
            )))
            .await
        else {
            panic!("mirror dropped its receiver");
        };
        let Some(state) = mirror.changed().await else {
            panic!("expected an error state emission");
        };
        let Some(error) = state.error else {
            panic!("expected error to be set");
        };
        assert!(error.contains("backend gone"));
        assert!(state.docs.is_empty(), "stale documents were dropped");
        assert!(mirror.changed().await.is_none(), "error is terminal");
    }
}
