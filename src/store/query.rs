//! Query composition for the document store boundary.
//!
//! A [`Query`] names a collection and composes equality/prefix filters,
//! at most one sort key, a result-size limit, and an opaque
//! [`Cursor`] bound. Both store backends interpret the same structure;
//! nothing outside the `store` module can look inside a cursor.

use serde_json::Value;

/// Sort direction for the single order key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The query's one sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpec {
    /// Document field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// A document filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the given value.
    Eq(String, Value),
    /// String field starts with the given prefix.
    Prefix(String, String),
}

/// Opaque position marker: identifies a document's place in a given
/// sort order so a query can resume strictly after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub(crate) sort_value: Value,
    pub(crate) doc_id: String,
}

/// A composed query against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub(crate) collection: String,
    pub(crate) filters: Vec<Filter>,
    pub(crate) order: Option<OrderSpec>,
    pub(crate) limit: Option<u32>,
    pub(crate) start_after: Option<Cursor>,
}

impl Query {
    /// Starts a query over the named collection.
    #[must_use]
    pub fn collection(name: &str) -> Self {
        Self {
            collection: name.to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
            start_after: None,
        }
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn filter_eq(mut self, field: &str, value: Value) -> Self {
        self.filters.push(Filter::Eq(field.to_string(), value));
        self
    }

    /// Adds a string prefix filter.
    #[must_use]
    pub fn filter_prefix(mut self, field: &str, prefix: &str) -> Self {
        self.filters
            .push(Filter::Prefix(field.to_string(), prefix.to_string()));
        self
    }

    /// Sets the sort key. Replaces any previous order.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some(OrderSpec {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Sets the result-size limit.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resumes the query strictly after the given cursor.
    #[must_use]
    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    /// Clears any cursor bound.
    #[must_use]
    pub fn unanchored(mut self) -> Self {
        self.start_after = None;
        self
    }

    /// Flips the sort direction, dropping any cursor bound.
    ///
    /// Used by the pager's reverse-order last-page query.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        if let Some(order) = &mut self.order {
            order.direction = order.direction.reversed();
        }
        self.start_after = None;
        self
    }

    /// Collection this query runs against.
    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// The sort key, if one was set.
    #[must_use]
    pub fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }
}
