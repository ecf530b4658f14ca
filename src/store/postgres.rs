//! PostgreSQL document store backend.
//!
//! Documents live in a single `documents(collection, id, fields jsonb)`
//! table. Queries translate to jsonb expressions; subscriptions are
//! poll-based, with a broadcast "nudge" so writes issued through this
//! process surface without waiting for the next poll tick.

use std::time::Duration;

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::{broadcast, mpsc};

use super::document::Document;
use super::query::{Direction, Filter, Query};
use super::subscription::Subscription;
use crate::config::BackofficeConfig;
use crate::error::BackofficeError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (\
    collection TEXT NOT NULL, \
    id TEXT NOT NULL, \
    fields JSONB NOT NULL, \
    PRIMARY KEY (collection, id))";

/// PostgreSQL-backed document store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    poll_interval: Duration,
    changes: broadcast::Sender<String>,
}

impl PostgresStore {
    /// Connects to the configured database and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] if the pool cannot connect or
    /// the schema statement fails.
    pub async fn connect(config: &BackofficeConfig) -> Result<Self, BackofficeError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| BackofficeError::Store(e.to_string()))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| BackofficeError::Store(e.to_string()))?;

        let (changes, _) = broadcast::channel(256);
        Ok(Self {
            pool,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            changes,
        })
    }

    /// Runs the query once.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on database failure.
    pub async fn get_once(&self, query: &Query) -> Result<Vec<Document>, BackofficeError> {
        let mut qb = select_builder("SELECT id, fields FROM documents", query);

        if let Some(order) = &query.order {
            let dir = match order.direction {
                Direction::Ascending => " ASC",
                Direction::Descending => " DESC",
            };
            qb.push(" ORDER BY fields->");
            qb.push_bind(order.field.clone());
            qb.push(dir);
            qb.push(", id");
            qb.push(dir);
        }
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        let rows: Vec<(String, Value)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BackofficeError::Store(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, fields)| Document::new(id, fields))
            .collect())
    }

    /// Counts documents matching the query's filters.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on database failure.
    pub async fn count_once(&self, query: &Query) -> Result<u64, BackofficeError> {
        let unbounded = query.clone().unanchored();
        let mut qb = select_builder("SELECT COUNT(*) FROM documents", &unbounded);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BackofficeError::Store(e.to_string()))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Merges the patch object into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] when the document does not
    /// exist, [`BackofficeError::Store`] on database failure.
    pub async fn write_doc(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<(), BackofficeError> {
        let result = sqlx::query(
            "UPDATE documents SET fields = fields || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(patch)
        .execute(&self.pool)
        .await
        .map_err(|e| BackofficeError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(BackofficeError::not_found(collection, id));
        }
        self.notify(collection);
        Ok(())
    }

    /// Creates or replaces a document.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on database failure.
    pub async fn set_doc(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), BackofficeError> {
        sqlx::query(
            "INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET fields = EXCLUDED.fields",
        )
        .bind(collection)
        .bind(id)
        .bind(fields)
        .execute(&self.pool)
        .await
        .map_err(|e| BackofficeError::Store(e.to_string()))?;

        self.notify(collection);
        Ok(())
    }

    /// Atomically adds `delta` to a numeric field, server-side.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] when the document does not
    /// exist, [`BackofficeError::Store`] on database failure.
    pub async fn atomic_increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), BackofficeError> {
        let result = sqlx::query(
            "UPDATE documents SET fields = jsonb_set(fields, ARRAY[$3], \
             to_jsonb(COALESCE((fields->>$3)::bigint, 0) + $4)) \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|e| BackofficeError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(BackofficeError::not_found(collection, id));
        }
        self.notify(collection);
        Ok(())
    }

    /// Deletes a document. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on database failure.
    pub async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), BackofficeError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| BackofficeError::Store(e.to_string()))?;
        self.notify(collection);
        Ok(())
    }

    /// Subscribes to the query. The backend re-runs the query on every
    /// poll tick (and on local-write nudges) and emits only when the
    /// result set changed. A query failure ends the stream with a
    /// terminal error — no reconnect.
    pub fn subscribe(&self, query: Query) -> Subscription {
        let (tx, rx) = mpsc::channel(16);
        let store = self.clone();
        let mut changes = self.changes.subscribe();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(store.poll_interval);
            let mut last: Option<Vec<Document>> = None;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    nudge = changes.recv() => {
                        if let Ok(name) = nudge
                            && name != query.collection {
                                continue;
                            }
                    }
                }
                match store.get_once(&query).await {
                    Ok(snapshot) => {
                        if last.as_ref() == Some(&snapshot) {
                            continue;
                        }
                        let stop = tx.send(Ok(snapshot.clone())).await.is_err();
                        last = Some(snapshot);
                        if stop {
                            break;
                        }
                    }
                    Err(err) => {
                        let _ = tx
                            .send(Err(BackofficeError::Subscription(err.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });
        Subscription::new(rx, task)
    }

    fn notify(&self, collection: &str) {
        let _ = self.changes.send(collection.to_string());
    }
}

/// Builds `{head} WHERE collection = $1 [AND filter...] [AND cursor]`.
fn select_builder<'a>(head: &str, query: &'a Query) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(head);
    qb.push(" WHERE collection = ");
    qb.push_bind(query.collection.clone());

    for filter in &query.filters {
        match filter {
            Filter::Eq(field, value) => {
                qb.push(" AND fields @> ");
                qb.push_bind(serde_json::json!({ field.clone(): value.clone() }));
            }
            Filter::Prefix(field, prefix) => {
                qb.push(" AND fields->>");
                qb.push_bind(field.clone());
                qb.push(" LIKE ");
                qb.push_bind(format!("{}%", escape_like(prefix)));
            }
        }
    }

    if let (Some(cursor), Some(order)) = (&query.start_after, &query.order) {
        let op = match order.direction {
            Direction::Ascending => " > ",
            Direction::Descending => " < ",
        };
        qb.push(" AND (fields->");
        qb.push_bind(order.field.clone());
        qb.push(", id)");
        qb.push(op);
        qb.push("(");
        qb.push_bind(cursor.sort_value.clone());
        qb.push(", ");
        qb.push_bind(cursor.doc_id.clone());
        qb.push(")");
    }

    qb
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
