//! Transaction settlement.
//!
//! Settling a deposit or withdrawal is a two-step write: the
//! transaction's status changes first, then (for approvals only) the
//! owning user's coin balance moves by the transaction amount. The two
//! writes are not atomic; a crash between them leaves an approved
//! transaction whose balance never moved. A per-transaction in-flight
//! set prevents the same transaction from being settled twice
//! concurrently from different connections on this process.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::json;

use crate::domain::{
    DocId, Transaction, TransactionStatus, TransactionType, User, collections,
};
use crate::error::BackofficeError;
use crate::store::Store;

/// Applies settlement decisions to transactions.
#[derive(Debug, Clone)]
pub struct SettlementService {
    store: Store,
    in_flight: Arc<Mutex<HashSet<DocId>>>,
}

impl SettlementService {
    /// Creates a settlement service over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Moves a transaction to `decision` and, when approving, adjusts
    /// the owning user's coin balance. The transaction is looked up in
    /// the caller's live snapshot, not re-fetched.
    ///
    /// Approving a deposit credits the amount; approving a withdrawal
    /// debits it. Resetting a settled transaction back to pending does
    /// not reverse the balance movement.
    ///
    /// # Errors
    ///
    /// [`BackofficeError::SettlementInFlight`] when this transaction is
    /// already being settled, [`BackofficeError::NotFound`] when it is
    /// absent from the snapshot, [`BackofficeError::InvalidTransition`]
    /// for a disallowed status change, and store errors from either
    /// write.
    pub async fn settle(
        &self,
        snapshot: &[Transaction],
        id: &DocId,
        decision: TransactionStatus,
    ) -> Result<(), BackofficeError> {
        let _guard = self.acquire(id)?;

        let Some(txn) = snapshot.iter().find(|t| &t.id == id) else {
            return Err(BackofficeError::not_found(
                collections::TRANSACTIONS,
                id.as_str(),
            ));
        };
        check_transition(txn.status, decision)?;

        self.store
            .write_doc(
                collections::TRANSACTIONS,
                id.as_str(),
                json!({
                    "status": decision.as_str(),
                    "updatedAt": Utc::now().to_rfc3339(),
                }),
            )
            .await?;

        if decision == TransactionStatus::Approved {
            let delta = match txn.kind {
                TransactionType::Deposit => txn.amount,
                TransactionType::Withdraw => -txn.amount,
            };
            self.store
                .atomic_increment(collections::USERS, txn.user_id.as_str(), "coins", delta)
                .await?;
        }

        tracing::info!(
            transaction = %id,
            status = decision.as_str(),
            "transaction settled"
        );
        Ok(())
    }

    fn acquire(&self, id: &DocId) -> Result<InFlightGuard, BackofficeError> {
        let mut set = self
            .in_flight
            .lock()
            .map_err(|_| BackofficeError::Internal("in-flight set poisoned".to_string()))?;
        if !set.insert(id.clone()) {
            return Err(BackofficeError::SettlementInFlight(id.to_string()));
        }
        Ok(InFlightGuard {
            set: Arc::clone(&self.in_flight),
            id: id.clone(),
        })
    }
}

/// Transitions allowed by the settlement workflow. A settled
/// transaction may only be reset to pending; a pending one may only be
/// approved or rejected.
fn check_transition(
    from: TransactionStatus,
    to: TransactionStatus,
) -> Result<(), BackofficeError> {
    use TransactionStatus::{Approved, Pending, Rejected};
    let allowed = matches!(
        (from, to),
        (Pending, Approved) | (Pending, Rejected) | (Approved, Pending) | (Rejected, Pending)
    );
    if allowed {
        Ok(())
    } else {
        Err(BackofficeError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}

struct InFlightGuard {
    set: Arc<Mutex<HashSet<DocId>>>,
    id: DocId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.id);
        }
    }
}

/// One display row: a transaction joined with its owner's identity.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    /// The transaction itself.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// Owner's in-game name, `"Unknown"` when the user is missing.
    pub in_game_name: String,
    /// Owner's email, `"Unknown"` when the user is missing.
    pub email: String,
}

/// Joins transactions with their owning users. Rows whose user is not
/// in `users` still appear, with `"Unknown"` identity fields.
#[must_use]
pub fn join_rows(transactions: &[Transaction], users: &[User]) -> Vec<TransactionRow> {
    transactions
        .iter()
        .map(|txn| {
            let owner = users.iter().find(|u| u.id == txn.user_id);
            TransactionRow {
                transaction: txn.clone(),
                in_game_name: owner
                    .map_or_else(|| "Unknown".to_string(), |u| u.in_game_name.clone()),
                email: owner.map_or_else(|| "Unknown".to_string(), |u| u.email.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::Query;

    async fn seed_user(store: &Store, id: &str, coins: i64) {
        store
            .set_doc(
                collections::USERS,
                id,
                json!({
                    "email": format!("{id}@example.com"),
                    "inGameName": format!("player-{id}"),
                    "coins": coins,
                }),
            )
            .await
            .unwrap_or_else(|e| panic!("seed user: {e}"));
    }

    async fn seed_txn(store: &Store, id: &str, kind: &str, amount: i64, status: &str) {
        store
            .set_doc(
                collections::TRANSACTIONS,
                id,
                json!({
                    "type": kind,
                    "amount": amount,
                    "userId": "u1",
                    "status": status,
                    "timestamp": "2026-01-01T00:00:00Z",
                }),
            )
            .await
            .unwrap_or_else(|e| panic!("seed txn: {e}"));
    }

    async fn snapshot(store: &Store) -> Vec<Transaction> {
        let docs = store
            .get_once(&Query::collection(collections::TRANSACTIONS))
            .await
            .unwrap_or_else(|e| panic!("snapshot: {e}"));
        crate::store::decode_all(&docs)
    }

    async fn user_coins(store: &Store, id: &str) -> i64 {
        let docs = store
            .get_once(&Query::collection(collections::USERS))
            .await
            .unwrap_or_else(|e| panic!("users: {e}"));
        let users: Vec<User> = crate::store::decode_all(&docs);
        users
            .iter()
            .find(|u| u.id.as_str() == id)
            .map_or(0, |u| u.coins)
    }

    #[tokio::test]
    async fn approving_a_deposit_credits_the_balance() {
        let store = Store::memory();
        seed_user(&store, "u1", 1000).await;
        seed_txn(&store, "t1", "deposit", 500, "pending").await;
        let service = SettlementService::new(store.clone());

        let snap = snapshot(&store).await;
        service
            .settle(&snap, &DocId::new("t1"), TransactionStatus::Approved)
            .await
            .unwrap_or_else(|e| panic!("settle: {e}"));

        assert_eq!(user_coins(&store, "u1").await, 1500);
        let after = snapshot(&store).await;
        let Some(txn) = after.iter().find(|t| t.id.as_str() == "t1") else {
            panic!("transaction vanished");
        };
        assert_eq!(txn.status, TransactionStatus::Approved);
        assert!(txn.updated_at.is_some());
    }

    #[tokio::test]
    async fn approving_a_withdrawal_debits_the_balance() {
        let store = Store::memory();
        seed_user(&store, "u1", 1000).await;
        seed_txn(&store, "t1", "withdraw", 300, "pending").await;
        let service = SettlementService::new(store.clone());

        let snap = snapshot(&store).await;
        service
            .settle(&snap, &DocId::new("t1"), TransactionStatus::Approved)
            .await
            .unwrap_or_else(|e| panic!("settle: {e}"));
        assert_eq!(user_coins(&store, "u1").await, 700);
    }

    #[tokio::test]
    async fn rejecting_leaves_the_balance_untouched() {
        let store = Store::memory();
        seed_user(&store, "u1", 1000).await;
        seed_txn(&store, "t1", "withdraw", 300, "pending").await;
        let service = SettlementService::new(store.clone());

        let snap = snapshot(&store).await;
        service
            .settle(&snap, &DocId::new("t1"), TransactionStatus::Rejected)
            .await
            .unwrap_or_else(|e| panic!("settle: {e}"));
        assert_eq!(user_coins(&store, "u1").await, 1000);
    }

    #[tokio::test]
    async fn resetting_an_approval_does_not_reverse_the_credit() {
        let store = Store::memory();
        seed_user(&store, "u1", 1000).await;
        seed_txn(&store, "t1", "deposit", 500, "pending").await;
        let service = SettlementService::new(store.clone());

        let snap = snapshot(&store).await;
        service
            .settle(&snap, &DocId::new("t1"), TransactionStatus::Approved)
            .await
            .unwrap_or_else(|e| panic!("approve: {e}"));

        let snap = snapshot(&store).await;
        service
            .settle(&snap, &DocId::new("t1"), TransactionStatus::Pending)
            .await
            .unwrap_or_else(|e| panic!("reset: {e}"));

        // The credit from the earlier approval stays in place.
        assert_eq!(user_coins(&store, "u1").await, 1500);
    }

    #[tokio::test]
    async fn same_state_transition_is_rejected() {
        let store = Store::memory();
        seed_txn(&store, "t1", "deposit", 500, "pending").await;
        let service = SettlementService::new(store.clone());

        let snap = snapshot(&store).await;
        let result = service
            .settle(&snap, &DocId::new("t1"), TransactionStatus::Pending)
            .await;
        assert!(matches!(
            result,
            Err(BackofficeError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn settling_a_transaction_missing_from_the_snapshot_fails() {
        let store = Store::memory();
        let service = SettlementService::new(store);
        let result = service
            .settle(&[], &DocId::new("ghost"), TransactionStatus::Approved)
            .await;
        assert!(matches!(result, Err(BackofficeError::NotFound { .. })));
    }

    fn txn_for(id: &str, user: &str) -> Transaction {
        Transaction {
            id: DocId::new(id),
            kind: TransactionType::Deposit,
            amount: 100,
            user_id: DocId::new(user),
            status: TransactionStatus::Pending,
            proof: None,
            account_number: None,
            account_type: None,
            account_name: None,
            timestamp: None,
            updated_at: None,
        }
    }

    #[test]
    fn join_falls_back_to_unknown_for_missing_users() {
        let rows = join_rows(&[txn_for("t1", "ghost")], &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|r| r.in_game_name.as_str()), Some("Unknown"));
        assert_eq!(rows.first().map(|r| r.email.as_str()), Some("Unknown"));
    }

    #[test]
    fn join_matches_users_by_id() {
        let user = User {
            id: DocId::new("u1"),
            email: "a@b.c".to_string(),
            in_game_name: "ace".to_string(),
            in_game_uid: String::new(),
            coins: 0,
            is_active: true,
            won_tournaments: 0,
            created_at: None,
        };
        let rows = join_rows(&[txn_for("t1", "u1")], &[user]);
        assert_eq!(rows.first().map(|r| r.in_game_name.as_str()), Some("ace"));
    }
}
