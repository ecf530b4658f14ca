//! Feedback intake.
//!
//! The bridge watches the feedback collection and fires one outbound
//! notification per newly arrived submission. The first snapshot after
//! startup only primes the seen-id set, so a restart never re-notifies
//! the backlog. Notification failures are logged, recorded as the
//! bridge's delivery status, and skipped; the bridge never stops over
//! a delivery problem.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{Feedback, collections};
use crate::error::BackofficeError;
use crate::store::{Direction, Query, Store, decode_all};

/// Outbound delivery for one feedback submission.
pub trait FeedbackNotifier: Send + Sync + 'static {
    /// Sends one notification. Errors are reported to the caller but
    /// never retried by the bridge.
    fn notify(
        &self,
        feedback: &Feedback,
    ) -> impl Future<Output = Result<(), BackofficeError>> + Send;
}

/// Background task bridging new feedback to a notifier.
#[derive(Debug)]
pub struct FeedbackBridge {
    primed: watch::Receiver<bool>,
    delivery: watch::Receiver<Option<String>>,
    task: JoinHandle<()>,
}

impl FeedbackBridge {
    /// Spawns the bridge. It keeps running until dropped or until the
    /// underlying subscription fails.
    pub fn spawn<N: FeedbackNotifier>(store: &Store, notifier: N) -> Self {
        let mut subscription = store.subscribe(
            Query::collection(collections::FEEDBACK)
                .order_by("timestamp", Direction::Descending),
        );
        let (primed_tx, primed) = watch::channel(false);
        let (delivery_tx, delivery) = watch::channel(None);
        let task = tokio::spawn(async move {
            let mut seen: Option<HashSet<String>> = None;
            while let Some(event) = subscription.recv().await {
                let docs = match event {
                    Ok(docs) => docs,
                    Err(err) => {
                        tracing::error!(error = %err, "feedback subscription failed");
                        break;
                    }
                };
                let entries: Vec<Feedback> = decode_all(&docs);
                match seen.as_mut() {
                    None => {
                        // Startup backlog: remember, do not notify.
                        seen = Some(entries.iter().map(|f| f.id.to_string()).collect());
                        let _ = primed_tx.send(true);
                    }
                    Some(seen) => {
                        for feedback in &entries {
                            if !seen.insert(feedback.id.to_string()) {
                                continue;
                            }
                            match notifier.notify(feedback).await {
                                Ok(()) => {
                                    // A delivery success clears the banner.
                                    if delivery_tx.borrow().is_some() {
                                        let _ = delivery_tx.send(None);
                                    }
                                }
                                Err(err) => {
                                    tracing::warn!(
                                        feedback = %feedback.id,
                                        error = %err,
                                        "feedback notification failed"
                                    );
                                    let _ = delivery_tx.send(Some(format!(
                                        "notification for feedback {} failed: {err}",
                                        feedback.id
                                    )));
                                }
                            }
                        }
                    }
                }
            }
        });
        Self {
            primed,
            delivery,
            task,
        }
    }

    /// Waits until the startup backlog has been absorbed.
    pub async fn ready(&mut self) {
        while !*self.primed.borrow() {
            if self.primed.changed().await.is_err() {
                return;
            }
        }
    }

    /// Watch handle over the bridge's delivery status. Carries the
    /// last failure message until a later delivery succeeds.
    #[must_use]
    pub fn delivery_status(&self) -> watch::Receiver<Option<String>> {
        self.delivery.clone()
    }
}

impl Drop for FeedbackBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Operator actions on feedback submissions.
#[derive(Debug, Clone)]
pub struct FeedbackService {
    store: Store,
}

impl FeedbackService {
    /// Creates the service over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Marks a submission read, stamping `readAt`.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] for an unknown
    /// submission, [`BackofficeError::Store`] on backend failure.
    pub async fn mark_read(&self, id: &str) -> Result<(), BackofficeError> {
        self.store
            .write_doc(
                collections::FEEDBACK,
                id,
                json!({
                    "isRead": true,
                    "readAt": Utc::now().to_rfc3339(),
                }),
            )
            .await
    }

    /// Deletes a submission.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn delete(&self, id: &str) -> Result<(), BackofficeError> {
        self.store.delete_doc(collections::FEEDBACK, id).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    struct RecordingNotifier {
        delivered: mpsc::UnboundedSender<String>,
    }

    impl FeedbackNotifier for RecordingNotifier {
        async fn notify(&self, feedback: &Feedback) -> Result<(), BackofficeError> {
            self.delivered
                .send(feedback.id.to_string())
                .map_err(|e| BackofficeError::Notification(e.to_string()))
        }
    }

    async fn seed_feedback(store: &Store, id: &str, ts: &str) {
        store
            .set_doc(
                collections::FEEDBACK,
                id,
                serde_json::json!({
                    "type": "general",
                    "rating": 5,
                    "message": "great",
                    "timestamp": ts,
                }),
            )
            .await
            .unwrap_or_else(|e| panic!("seed: {e}"));
    }

    async fn recv_with_timeout(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn backlog_is_primed_without_notifications() {
        let store = Store::memory();
        for n in 0..5 {
            seed_feedback(&store, &format!("f{n}"), "2026-01-01T00:00:00Z").await;
        }
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut bridge = FeedbackBridge::spawn(&store, RecordingNotifier { delivered: tx });
        bridge.ready().await;

        seed_feedback(&store, "f5", "2026-01-02T00:00:00Z").await;
        seed_feedback(&store, "f6", "2026-01-03T00:00:00Z").await;

        let mut delivered = Vec::new();
        while delivered.len() < 2 {
            let Some(id) = recv_with_timeout(&mut rx).await else {
                panic!("expected two notifications, got {delivered:?}");
            };
            delivered.push(id);
        }
        delivered.sort();
        assert_eq!(delivered, ["f5", "f6"]);

        // Nothing from the original backlog, and no duplicates.
        let extra = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra notification: {extra:?}");
    }

    #[tokio::test]
    async fn rereading_a_doc_does_not_renotify() {
        let store = Store::memory();
        seed_feedback(&store, "f0", "2026-01-01T00:00:00Z").await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut bridge = FeedbackBridge::spawn(&store, RecordingNotifier { delivered: tx });
        bridge.ready().await;

        let service = FeedbackService::new(store.clone());
        service
            .mark_read("f0")
            .await
            .unwrap_or_else(|e| panic!("mark read: {e}"));

        let extra = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(extra.is_err(), "update to a seen doc must not notify");
    }

    struct FailingNotifier;

    impl FeedbackNotifier for FailingNotifier {
        async fn notify(&self, feedback: &Feedback) -> Result<(), BackofficeError> {
            Err(BackofficeError::Notification(format!(
                "smtp down for {}",
                feedback.id
            )))
        }
    }

    #[tokio::test]
    async fn delivery_failure_is_recorded_as_status() {
        let store = Store::memory();
        let mut bridge = FeedbackBridge::spawn(&store, FailingNotifier);
        bridge.ready().await;
        let mut status = bridge.delivery_status();
        assert!(status.borrow().is_none(), "no failure before any delivery");

        seed_feedback(&store, "f0", "2026-01-01T00:00:00Z").await;

        let Ok(Ok(())) = tokio::time::timeout(Duration::from_secs(2), status.changed()).await
        else {
            panic!("expected a delivery status update");
        };
        let Some(message) = status.borrow_and_update().clone() else {
            panic!("expected a failure message");
        };
        assert!(message.contains("f0"));
        assert!(message.contains("smtp down"));
    }

    #[tokio::test]
    async fn mark_read_stamps_the_document() {
        let store = Store::memory();
        seed_feedback(&store, "f0", "2026-01-01T00:00:00Z").await;
        FeedbackService::new(store.clone())
            .mark_read("f0")
            .await
            .unwrap_or_else(|e| panic!("mark read: {e}"));

        let docs = store
            .get_once(&Query::collection(collections::FEEDBACK))
            .await
            .unwrap_or_else(|e| panic!("read back: {e}"));
        let entries: Vec<Feedback> = decode_all(&docs);
        let Some(entry) = entries.first() else {
            panic!("feedback vanished");
        };
        assert!(entry.is_read);
        assert!(entry.read_at.is_some());
    }
}
