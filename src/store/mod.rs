//! Document store boundary.
//!
//! Every collection the back office touches goes through [`Store`]: a
//! schemaless document interface with one-shot reads, merge/replace
//! writes, a server-side numeric increment, and push subscriptions that
//! deliver full result-set snapshots. Two backends implement it: an
//! in-process [`MemoryStore`] used by tests and local runs, and a
//! [`PostgresStore`] that keeps documents in a single jsonb table.

mod document;
mod memory;
mod postgres;
mod query;
mod subscription;

use serde_json::Value;

pub use document::{Document, decode_all};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use query::{Cursor, Direction, Filter, OrderSpec, Query};
pub use subscription::Subscription;

use crate::error::BackofficeError;

/// Backend-dispatching document store handle.
///
/// Cloning is cheap; all clones share the same underlying state.
#[derive(Debug, Clone)]
pub enum Store {
    /// In-memory backend.
    Memory(MemoryStore),
    /// PostgreSQL backend.
    Postgres(PostgresStore),
}

impl Store {
    /// Creates a fresh in-memory store.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Runs the query once and returns the matching documents in order.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn get_once(&self, query: &Query) -> Result<Vec<Document>, BackofficeError> {
        match self {
            Self::Memory(s) => s.get_once(query).await,
            Self::Postgres(s) => s.get_once(query).await,
        }
    }

    /// Counts all documents matching the query's filters, ignoring
    /// limit and cursor.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn count_once(&self, query: &Query) -> Result<u64, BackofficeError> {
        match self {
            Self::Memory(s) => s.count_once(query).await,
            Self::Postgres(s) => s.count_once(query).await,
        }
    }

    /// Merges the patch object into an existing document's fields.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] when the document does not
    /// exist, [`BackofficeError::Store`] on backend failure.
    pub async fn write_doc(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<(), BackofficeError> {
        match self {
            Self::Memory(s) => s.write_doc(collection, id, patch).await,
            Self::Postgres(s) => s.write_doc(collection, id, patch).await,
        }
    }

    /// Creates or fully replaces a document.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn set_doc(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), BackofficeError> {
        match self {
            Self::Memory(s) => s.set_doc(collection, id, fields).await,
            Self::Postgres(s) => s.set_doc(collection, id, fields).await,
        }
    }

    /// Atomically adds `delta` to a numeric field. A missing or
    /// non-numeric field is treated as zero.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] when the document does not
    /// exist, [`BackofficeError::Store`] on backend failure.
    pub async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), BackofficeError> {
        match self {
            Self::Memory(s) => s.atomic_increment(collection, id, field, delta).await,
            Self::Postgres(s) => s.atomic_increment(collection, id, field, delta).await,
        }
    }

    /// Deletes a document. Deleting a missing document is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), BackofficeError> {
        match self {
            Self::Memory(s) => s.delete_doc(collection, id).await,
            Self::Postgres(s) => s.delete_doc(collection, id).await,
        }
    }

    /// Opens a push subscription for the query. The first emission is
    /// the current result set; later emissions replace it wholesale.
    /// Dropping the handle tears the subscription down.
    #[must_use]
    pub fn subscribe(&self, query: Query) -> Subscription {
        match self {
            Self::Memory(s) => s.subscribe(query),
            Self::Postgres(s) => s.subscribe(query),
        }
    }
}
