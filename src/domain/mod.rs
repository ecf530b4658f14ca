//! Domain layer: document keys and the platform's document models.
//!
//! Everything here is a transient projection of documents owned by the
//! external store; no type in this module is a source of truth.

pub mod doc_id;
pub mod models;

pub use doc_id::DocId;
pub use models::{
    Category, Feedback, FeedbackKind, MenuItemKind, MoreScreenConfig, MoreScreenItem, Tournament,
    Transaction, TransactionStatus, TransactionType, User, collections,
};
