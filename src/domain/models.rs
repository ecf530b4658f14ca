//! Document models for the platform collections.
//!
//! All durable state lives in the external document store; these types
//! are transient in-memory projections decoded at the application
//! boundary. Serde names follow the camelCase fields the mobile app
//! writes, and every optional field defaults the way the store's weak
//! typing demands (an absent `isActive` means active, an absent
//! `isRead` means unread).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DocId;

/// Collection names as the mobile app created them.
pub mod collections {
    /// Registered platform users.
    pub const USERS: &str = "users";
    /// Tournaments currently offered in the app.
    pub const TOURNAMENTS: &str = "active-tournaments";
    /// Tournament category catalog.
    pub const CATEGORIES: &str = "tournament-categories";
    /// Deposit and withdrawal requests.
    pub const TRANSACTIONS: &str = "transactions";
    /// User feedback submissions.
    pub const FEEDBACK: &str = "feedback";
    /// Single-document collection holding the more-screen config.
    pub const MORE_SCREEN: &str = "moreScreenItems";
    /// Key of the one config document inside [`MORE_SCREEN`].
    pub const MORE_SCREEN_DOC: &str = "config";
}

fn default_true() -> bool {
    true
}

/// A platform user. Created by the mobile app's signup flow; this
/// system only toggles, deletes, and adjusts the coin balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document key (injected from the store on decode).
    #[serde(default)]
    pub id: DocId,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Display name inside the game.
    #[serde(default)]
    pub in_game_name: String,
    /// In-game UID shown to tournament hosts.
    #[serde(default, rename = "inGameUID")]
    pub in_game_uid: String,
    /// Coin balance. Adjusted only through atomic increments.
    #[serde(default)]
    pub coins: i64,
    /// Absent means active.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Tournaments won counter.
    #[serde(default)]
    pub won_tournaments: u32,
    /// Signup timestamp, when the app recorded one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A tournament offered in the app. Admin-owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    /// Document key.
    #[serde(default)]
    pub id: DocId,
    /// Tournament name.
    #[serde(default)]
    pub name: String,
    /// Category reference.
    #[serde(default)]
    pub category_id: String,
    /// Entry fee in coins.
    #[serde(default)]
    pub entry_fee: i64,
    /// Prize pool in coins.
    #[serde(default)]
    pub prize_pool: i64,
    /// Slot capacity.
    #[serde(default)]
    pub total_slots: u32,
    /// Users who booked a slot.
    #[serde(default)]
    pub booked_slots: Vec<DocId>,
    /// Whether the tournament is visible in the app.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Room id, sent after creation as an out-of-band update.
    #[serde(default)]
    pub room_id: Option<String>,
    /// Room password, sent together with the room id.
    #[serde(default)]
    pub pass: Option<String>,
    /// Banner image reference (secure URL from the upload boundary).
    #[serde(default)]
    pub image: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A tournament category. Created or deleted by admin, otherwise
/// immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Document key.
    #[serde(default)]
    pub id: DocId,
    /// Category name.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Deposit vs withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// User pays in; approval credits coins.
    Deposit,
    /// User cashes out; approval debits coins.
    Withdraw,
}

/// Settlement status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting operator action.
    Pending,
    /// Approved; the balance effect has been applied.
    Approved,
    /// Rejected; no balance effect.
    Rejected,
}

impl TransactionStatus {
    /// Lowercase wire form, as stored in documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A deposit or withdrawal request. Created by the mobile app; only
/// `status` and `updatedAt` are mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Document key.
    #[serde(default)]
    pub id: DocId,
    /// Deposit or withdrawal.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Positive amount in coin units.
    #[serde(default)]
    pub amount: i64,
    /// Owning user reference.
    #[serde(default)]
    pub user_id: DocId,
    /// Settlement status.
    pub status: TransactionStatus,
    /// Payment proof image reference, for deposits.
    #[serde(default)]
    pub proof: Option<String>,
    /// Withdrawal destination account number.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Withdrawal account type (bank, wallet, ...).
    #[serde(default)]
    pub account_type: Option<String>,
    /// Withdrawal account holder name.
    #[serde(default)]
    pub account_name: Option<String>,
    /// Creation timestamp, store-assigned.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Last settlement action timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Feedback category submitted from the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// General feedback.
    General,
    /// Bug report.
    Bug,
    /// Feature request.
    Feature,
    /// Complaint.
    Complaint,
}

impl Default for FeedbackKind {
    fn default() -> Self {
        Self::General
    }
}

/// A user feedback submission. Created by the mobile app; admin may
/// mark it read or delete it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Document key.
    #[serde(default)]
    pub id: DocId,
    /// Feedback category.
    #[serde(default, rename = "type")]
    pub kind: FeedbackKind,
    /// Star rating, 1–5.
    #[serde(default)]
    pub rating: u8,
    /// Free-text message.
    #[serde(default)]
    pub message: String,
    /// Whether an operator has read it.
    #[serde(default)]
    pub is_read: bool,
    /// When it was marked read.
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    /// Submitting platform (ios/android).
    #[serde(default)]
    pub platform: Option<String>,
    /// App version metadata as the app sent it.
    #[serde(default)]
    pub app_version: Option<serde_json::Value>,
    /// Device metadata as the app sent it.
    #[serde(default)]
    pub device_info: Option<serde_json::Value>,
    /// Submission timestamp.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// What tapping a more-screen menu item does in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    /// Navigates to an in-app screen named by `navigationTarget`.
    Navigate,
    /// Runs a named in-app action.
    Action,
    /// Expands inline content.
    Toggle,
    /// Opens an external URL.
    Link,
}

impl Default for MenuItemKind {
    fn default() -> Self {
        Self::Navigate
    }
}

/// One entry of the mobile app's "more" screen menu.
///
/// The whole ordered list lives inside a single config document;
/// membership and order are always written back as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoreScreenItem {
    /// Item id within the list (not a store key).
    #[serde(default)]
    pub id: String,
    /// Title line.
    #[serde(default)]
    pub title: String,
    /// Subtitle line.
    #[serde(default)]
    pub subtitle: String,
    /// Icon key understood by the app.
    #[serde(default)]
    pub icon: String,
    /// Accent color hex string.
    #[serde(default)]
    pub color: String,
    /// Tap behavior.
    #[serde(default, rename = "type")]
    pub kind: MenuItemKind,
    /// Screen name, action name, or URL depending on `kind`.
    #[serde(default)]
    pub navigation_target: String,
    /// Inline content for `toggle` items.
    #[serde(default)]
    pub content: String,
    /// Whether the app renders the item.
    #[serde(default = "default_true")]
    pub is_visible: bool,
    /// Whether the item expands inline.
    #[serde(default)]
    pub is_expandable: bool,
    /// Display position; dense, 1-based, unique across the list.
    #[serde(default)]
    pub order: u32,
    /// Per-item last-edit timestamp (ISO-8601 string, app convention).
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// The single more-screen config document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoreScreenConfig {
    /// Ordered menu items.
    #[serde(default)]
    pub items: Vec<MoreScreenItem>,
    /// Document-level last-save timestamp (ISO-8601 string).
    #[serde(default)]
    pub last_updated: Option<String>,
}
