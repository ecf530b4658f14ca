//! Live subscription handle.
//!
//! A [`Subscription`] delivers full result-set snapshots for one query.
//! Dropping the handle aborts the backend task — the only cancellation
//! primitive the boundary offers.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::document::Document;
use crate::error::BackofficeError;

/// Snapshot stream for one subscribed query.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<Result<Vec<Document>, BackofficeError>>,
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: mpsc::Receiver<Result<Vec<Document>, BackofficeError>>,
        task: JoinHandle<()>,
    ) -> Self {
        Self { receiver, task }
    }

    /// Waits for the next snapshot. `None` means the listener ended.
    ///
    /// An `Err` emission is terminal: the backend does not reconnect,
    /// per the boundary contract.
    pub async fn recv(&mut self) -> Option<Result<Vec<Document>, BackofficeError>> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
