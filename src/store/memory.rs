//! In-process document store backend.
//!
//! Used by tests and local development. Collections live behind a
//! `tokio::sync::RwLock`; every write publishes the touched collection
//! name on a broadcast channel, and each subscription re-runs its query
//! on matching notifications — so every emission is the full current
//! result set, never a delta.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::DateTime;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast, mpsc};

use super::document::Document;
use super::query::{Direction, Filter, Query};
use super::subscription::Subscription;
use crate::error::BackofficeError;

/// In-memory store backend.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    changes: broadcast::Sender<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Runs the query once against the current state.
    ///
    /// # Errors
    ///
    /// Infallible for the in-memory backend; the `Result` mirrors the
    /// persistent backend's signature.
    pub async fn get_once(&self, query: &Query) -> Result<Vec<Document>, BackofficeError> {
        let collections = self.inner.collections.read().await;
        Ok(eval(collections.get(&query.collection), query))
    }

    /// Counts the documents matching the query's filters.
    ///
    /// # Errors
    ///
    /// Infallible for the in-memory backend; the `Result` mirrors the
    /// persistent backend's signature.
    pub async fn count_once(&self, query: &Query) -> Result<u64, BackofficeError> {
        let unbounded = query.clone().unanchored();
        let unbounded = Query {
            limit: None,
            ..unbounded
        };
        let collections = self.inner.collections.read().await;
        Ok(eval(collections.get(&query.collection), &unbounded).len() as u64)
    }

    /// Merges the patch object into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] when the document does not
    /// exist and [`BackofficeError::Write`] when either side is not a
    /// JSON object.
    pub async fn write_doc(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<(), BackofficeError> {
        {
            let mut collections = self.inner.collections.write().await;
            let docs = collections
                .get_mut(collection)
                .ok_or_else(|| BackofficeError::not_found(collection, id))?;
            let doc = docs
                .get_mut(id)
                .ok_or_else(|| BackofficeError::not_found(collection, id))?;
            let (Value::Object(doc), Value::Object(patch)) = (doc, patch) else {
                return Err(BackofficeError::Write(
                    "patch and document must be objects".to_string(),
                ));
            };
            for (key, value) in patch {
                doc.insert(key, value);
            }
        }
        self.notify(collection);
        Ok(())
    }

    /// Creates or replaces a document.
    ///
    /// # Errors
    ///
    /// Infallible for the in-memory backend; the `Result` mirrors the
    /// persistent backend's signature.
    pub async fn set_doc(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), BackofficeError> {
        {
            let mut collections = self.inner.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }
        self.notify(collection);
        Ok(())
    }

    /// Atomically adds `delta` to a numeric field of an existing
    /// document. The whole read-modify-write runs under the store's
    /// write lock, so concurrent increments never lose updates.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] when the document does not
    /// exist and [`BackofficeError::Write`] when it is not a JSON
    /// object.
    pub async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), BackofficeError> {
        {
            let mut collections = self.inner.collections.write().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| BackofficeError::not_found(collection, id))?;
            let Value::Object(map) = doc else {
                return Err(BackofficeError::Write(
                    "document must be an object".to_string(),
                ));
            };
            let current = map.get(field).and_then(Value::as_i64).unwrap_or(0);
            map.insert(field.to_string(), Value::from(current + delta));
        }
        self.notify(collection);
        Ok(())
    }

    /// Deletes a document. Idempotent.
    ///
    /// # Errors
    ///
    /// Infallible for the in-memory backend; the `Result` mirrors the
    /// persistent backend's signature.
    pub async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), BackofficeError> {
        {
            let mut collections = self.inner.collections.write().await;
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(id);
            }
        }
        self.notify(collection);
        Ok(())
    }

    /// Subscribes to the query: emits the full result set now and after
    /// every write touching the collection. Dropping the returned
    /// handle disposes the listener.
    pub fn subscribe(&self, query: Query) -> Subscription {
        let (tx, rx) = mpsc::channel(16);
        let inner = Arc::clone(&self.inner);
        // Register for changes before the initial snapshot so no write
        // slips between the two.
        let mut changes = self.inner.changes.subscribe();
        let task = tokio::spawn(async move {
            let snapshot = {
                let collections = inner.collections.read().await;
                eval(collections.get(&query.collection), &query)
            };
            if tx.send(Ok(snapshot)).await.is_err() {
                return;
            }
            loop {
                match changes.recv().await {
                    Ok(name) if name != query.collection => continue,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                let snapshot = {
                    let collections = inner.collections.read().await;
                    eval(collections.get(&query.collection), &query)
                };
                if tx.send(Ok(snapshot)).await.is_err() {
                    break;
                }
            }
        });
        Subscription::new(rx, task)
    }

    fn notify(&self, collection: &str) {
        let _ = self.inner.changes.send(collection.to_string());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a query against one collection snapshot.
fn eval(docs: Option<&BTreeMap<String, Value>>, query: &Query) -> Vec<Document> {
    let Some(docs) = docs else {
        return Vec::new();
    };

    let mut matched: Vec<Document> = docs
        .iter()
        .filter(|(_, fields)| query.filters.iter().all(|f| matches_filter(fields, f)))
        .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
        .collect();

    if let Some(order) = &query.order {
        matched.sort_by(|a, b| {
            ordered_cmp(
                &sort_key(a, &order.field),
                &sort_key(b, &order.field),
                order.direction,
            )
        });
        if let Some(cursor) = &query.start_after {
            let anchor = (cursor.sort_value.clone(), cursor.doc_id.clone());
            matched.retain(|doc| {
                ordered_cmp(&sort_key(doc, &order.field), &anchor, order.direction)
                    == Ordering::Greater
            });
        }
    }

    if let Some(limit) = query.limit {
        matched.truncate(limit as usize);
    }
    matched
}

fn matches_filter(fields: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, value) => fields.get(field) == Some(value),
        Filter::Prefix(field, prefix) => fields
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| s.starts_with(prefix)),
    }
}

fn sort_key(doc: &Document, field: &str) -> (Value, String) {
    (
        doc.fields.get(field).cloned().unwrap_or(Value::Null),
        doc.id.to_string(),
    )
}

/// Total order over (sort value, doc id), reversed for descending
/// queries so a cursor always resumes "later in the result order".
fn ordered_cmp(a: &(Value, String), b: &(Value, String), direction: Direction) -> Ordering {
    let base = cmp_value(&a.0, &b.0).then_with(|| a.1.cmp(&b.1));
    match direction {
        Direction::Ascending => base,
        Direction::Descending => base.reverse(),
    }
}

/// Cross-type value ordering: Null < Bool < Number < String < Array <
/// Object. Strings that both parse as RFC 3339 timestamps compare as
/// instants, so mixed-precision timestamps order correctly.
fn cmp_value(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let xf = x.as_f64().unwrap_or(f64::NAN);
            let yf = y.as_f64().unwrap_or(f64::NAN);
            xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(xt), Ok(yt)) => xt.cmp(&yt),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::store::query::Direction;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (id, amount, ts) in [
            ("t1", 100, "2026-01-01T00:00:01Z"),
            ("t2", 200, "2026-01-01T00:00:02Z"),
            ("t3", 300, "2026-01-01T00:00:03Z"),
        ] {
            let result = store
                .set_doc(
                    "transactions",
                    id,
                    serde_json::json!({"amount": amount, "timestamp": ts, "status": "pending"}),
                )
                .await;
            assert!(result.is_ok());
        }
        store
    }

    fn ids(docs: &[Document]) -> Vec<String> {
        docs.iter().map(|d| d.id.to_string()).collect()
    }

    #[tokio::test]
    async fn get_once_orders_descending() {
        let store = seeded().await;
        let q = Query::collection("transactions").order_by("timestamp", Direction::Descending);
        let docs = store.get_once(&q).await;
        let Ok(docs) = docs else {
            panic!("query should succeed");
        };
        assert_eq!(ids(&docs), vec!["t3", "t2", "t1"]);
    }

    #[tokio::test]
    async fn cursor_resumes_after_document() {
        let store = seeded().await;
        let q = Query::collection("transactions")
            .order_by("timestamp", Direction::Descending)
            .limit(1);
        let first = store.get_once(&q).await;
        let Ok(first) = first else {
            panic!("query should succeed");
        };
        let Some(order) = q.order() else {
            panic!("order is set");
        };
        let Some(head) = first.first() else {
            panic!("one document expected");
        };
        let next_q = q.clone().start_after(head.cursor(order));
        let next = store.get_once(&next_q).await;
        let Ok(next) = next else {
            panic!("query should succeed");
        };
        assert_eq!(ids(&next), vec!["t2"]);
    }

    #[tokio::test]
    async fn count_ignores_limit_and_cursor() {
        let store = seeded().await;
        let q = Query::collection("transactions")
            .order_by("timestamp", Direction::Descending)
            .limit(1);
        assert_eq!(store.count_once(&q).await.ok(), Some(3));
    }

    #[tokio::test]
    async fn eq_filter_matches() {
        let store = seeded().await;
        let result = store
            .write_doc(
                "transactions",
                "t2",
                serde_json::json!({"status": "approved"}),
            )
            .await;
        assert!(result.is_ok());
        let q = Query::collection("transactions")
            .filter_eq("status", serde_json::json!("approved"))
            .order_by("timestamp", Direction::Descending);
        let docs = store.get_once(&q).await;
        let Ok(docs) = docs else {
            panic!("query should succeed");
        };
        assert_eq!(ids(&docs), vec!["t2"]);
    }

    #[tokio::test]
    async fn write_doc_merges_and_missing_doc_errors() {
        let store = seeded().await;
        let result = store
            .write_doc("transactions", "t1", serde_json::json!({"status": "approved"}))
            .await;
        assert!(result.is_ok());
        let q = Query::collection("transactions");
        let docs = store.get_once(&q).await;
        let Ok(docs) = docs else {
            panic!("query should succeed");
        };
        let Some(t1) = docs.iter().find(|d| d.id.as_str() == "t1") else {
            panic!("t1 should exist");
        };
        // Untouched fields survive the merge.
        assert_eq!(t1.fields.get("amount"), Some(&serde_json::json!(100)));
        assert_eq!(t1.fields.get("status"), Some(&serde_json::json!("approved")));

        let missing = store
            .write_doc("transactions", "nope", serde_json::json!({"status": "x"}))
            .await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn atomic_increment_adds_delta() {
        let store = MemoryStore::new();
        let result = store
            .set_doc("users", "u1", serde_json::json!({"coins": 1000}))
            .await;
        assert!(result.is_ok());
        let result = store.atomic_increment("users", "u1", "coins", -300).await;
        assert!(result.is_ok());
        let docs = store.get_once(&Query::collection("users")).await;
        let Ok(docs) = docs else {
            panic!("query should succeed");
        };
        let Some(u1) = docs.first() else {
            panic!("u1 should exist");
        };
        assert_eq!(u1.fields.get("coins"), Some(&serde_json::json!(700)));
    }

    #[tokio::test]
    async fn subscribe_emits_initial_and_updated_snapshots() {
        let store = seeded().await;
        let q = Query::collection("transactions").order_by("timestamp", Direction::Descending);
        let mut sub = store.subscribe(q);

        let initial = sub.recv().await;
        let Some(Ok(initial)) = initial else {
            panic!("initial snapshot expected");
        };
        assert_eq!(initial.len(), 3);

        let result = store
            .set_doc(
                "transactions",
                "t4",
                serde_json::json!({"amount": 400, "timestamp": "2026-01-01T00:00:04Z"}),
            )
            .await;
        assert!(result.is_ok());

        let updated = sub.recv().await;
        let Some(Ok(updated)) = updated else {
            panic!("updated snapshot expected");
        };
        assert_eq!(updated.len(), 4);
        assert_eq!(updated.first().map(|d| d.id.to_string()), Some("t4".to_string()));
    }

    #[tokio::test]
    async fn subscribe_ignores_other_collections() {
        let store = seeded().await;
        let mut sub = store.subscribe(Query::collection("transactions"));
        let _ = sub.recv().await;

        let result = store
            .set_doc("users", "u1", serde_json::json!({"coins": 1}))
            .await;
        assert!(result.is_ok());

        // No emission for the unrelated write.
        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(50), sub.recv()).await;
        assert!(outcome.is_err());
    }

    #[test]
    fn timestamp_strings_compare_as_instants() {
        let a = serde_json::json!("2026-01-01T00:00:11Z");
        let b = serde_json::json!("2026-01-01T00:00:11.500Z");
        assert_eq!(cmp_value(&a, &b), Ordering::Less);
    }
}
