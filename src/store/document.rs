//! Documents as the store returns them: an opaque key plus weakly
//! typed JSON fields. Typed decoding happens at the application
//! boundary via [`Document::decode`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::query::{Cursor, OrderSpec};
use crate::domain::DocId;
use crate::error::BackofficeError;

/// One document from a collection query or subscription snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store key of the document.
    pub id: DocId,
    /// Schemaless field map.
    pub fields: Value,
}

impl Document {
    /// Creates a document from its key and field map.
    #[must_use]
    pub fn new(id: impl Into<DocId>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes the fields into a typed model, injecting the document
    /// key as the model's `id` field.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] when the fields do not
    /// satisfy the model's boundary validation.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BackofficeError> {
        let mut value = self.fields.clone();
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), Value::String(self.id.to_string()));
        }
        serde_json::from_value(value).map_err(|e| {
            BackofficeError::Validation(format!("document {} failed to decode: {e}", self.id))
        })
    }

    /// Produces the cursor marking this document's position under the
    /// given sort key.
    #[must_use]
    pub fn cursor(&self, order: &OrderSpec) -> Cursor {
        Cursor {
            sort_value: self
                .fields
                .get(&order.field)
                .cloned()
                .unwrap_or(Value::Null),
            doc_id: self.id.to_string(),
        }
    }
}

/// Decodes a full snapshot into typed models, skipping documents that
/// fail boundary validation (they are logged, not fatal — the store's
/// weak typing is a given).
#[must_use]
pub fn decode_all<T: DeserializeOwned>(docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(model) => Some(model),
            Err(err) => {
                tracing::warn!(id = %doc.id, %err, "skipping malformed document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Transaction, TransactionStatus, TransactionType};
    use crate::store::query::Direction;

    fn deposit_doc() -> Document {
        Document::new(
            "t1",
            serde_json::json!({
                "type": "deposit",
                "amount": 500,
                "userId": "u1",
                "status": "pending",
            }),
        )
    }

    #[test]
    fn decode_injects_id() {
        let doc = deposit_doc();
        let tx: Result<Transaction, _> = doc.decode();
        let Ok(tx) = tx else {
            panic!("decode should succeed");
        };
        assert_eq!(tx.id, DocId::new("t1"));
        assert_eq!(tx.kind, TransactionType::Deposit);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[test]
    fn cursor_uses_sort_field_value() {
        let doc = deposit_doc();
        let order = OrderSpec {
            field: "amount".to_string(),
            direction: Direction::Descending,
        };
        let cursor = doc.cursor(&order);
        assert_eq!(cursor.sort_value, serde_json::json!(500));
        assert_eq!(cursor.doc_id, "t1");
    }

    #[test]
    fn cursor_for_missing_field_is_null() {
        let doc = deposit_doc();
        let order = OrderSpec {
            field: "timestamp".to_string(),
            direction: Direction::Descending,
        };
        assert_eq!(doc.cursor(&order).sort_value, Value::Null);
    }

    #[test]
    fn decode_all_skips_malformed() {
        let good = deposit_doc();
        let bad = Document::new("t2", serde_json::json!({"type": "transfer", "status": "x"}));
        let decoded: Vec<Transaction> = decode_all(&[good, bad]);
        assert_eq!(decoded.len(), 1);
    }
}
