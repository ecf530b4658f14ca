//! Application services over the document store.

pub mod feedback;
pub mod identity;
pub mod live_sync;
pub mod more_screen;
pub mod pager;
pub mod roster;
pub mod settlement;
pub mod tournaments;
pub mod transactions_view;

pub use feedback::{FeedbackBridge, FeedbackNotifier, FeedbackService};
pub use identity::{AuthProvider, Identity, IdentityGate, IdentityState, StaticCredentials};
pub use live_sync::{LiveMirror, MirrorState};
pub use more_screen::{MenuItemDraft, MoreScreenService, MoveDirection};
pub use pager::CursorPager;
pub use roster::{RosterService, search_users};
pub use settlement::{SettlementService, TransactionRow, join_rows};
pub use tournaments::{
    CategoryDraft, TournamentDraft, TournamentService, search_categories, search_tournaments,
};
pub use transactions_view::{TransactionPage, TransactionsView};
