//! Type-safe document key.
//!
//! [`DocId`] wraps the store's opaque string keys so document
//! identifiers cannot be confused with other strings. Keys assigned by
//! the mobile app arrive as arbitrary strings; caller-assigned keys for
//! new documents are generated from UUID v4.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique key of a document within a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Creates a `DocId` from an existing key string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generates a fresh caller-assigned key (UUID v4).
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DocId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for DocId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn random_generates_unique_keys() {
        let a = DocId::random();
        let b = DocId::random();
        assert_ne!(a, b);
    }

    #[test]
    fn serde_is_transparent() {
        let id = DocId::new("t1");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"t1\""));
        let back: Option<DocId> = serde_json::from_str("\"t1\"").ok();
        assert_eq!(back, Some(id));
    }

    #[test]
    fn hash_works_in_hashset() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(DocId::new("t1"));
        assert!(set.contains(&DocId::new("t1")));
        assert!(!set.contains(&DocId::new("t2")));
    }
}
