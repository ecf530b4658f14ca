//! Per-connection transactions console view.
//!
//! Each connected operator gets their own view: two live mirrors (the
//! transaction feed and the user roster, joined for display), a pager
//! over the same ordered feed, and the settlement entry point. The
//! settlement lookup always goes through this view's own mirror, never
//! a re-fetch, so the operator acts on exactly what they see.

use serde::Serialize;

use super::live_sync::LiveMirror;
use super::pager::CursorPager;
use super::settlement::{SettlementService, TransactionRow, join_rows};
use crate::domain::{DocId, Transaction, TransactionStatus, User, collections};
use crate::error::BackofficeError;
use crate::store::{Direction, Document, Query, Store, decode_all};

/// One page of joined transaction rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    /// Joined display rows in feed order.
    pub rows: Vec<TransactionRow>,
    /// 1-based page number.
    pub page: u64,
    /// Page count implied by the last known total.
    pub total_pages: u64,
    /// Total matching transactions.
    pub total: u64,
}

/// Live transactions console state for one connection.
#[derive(Debug)]
pub struct TransactionsView {
    transactions: LiveMirror<Transaction>,
    users: LiveMirror<User>,
    pager: CursorPager,
    settlement: SettlementService,
}

impl TransactionsView {
    /// Opens the view: starts both mirrors and loads nothing yet.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] if the pager query
    /// cannot be built.
    pub fn open(
        store: &Store,
        settlement: SettlementService,
        page_size: u32,
    ) -> Result<Self, BackofficeError> {
        let feed = Query::collection(collections::TRANSACTIONS)
            .order_by("timestamp", Direction::Descending);
        Ok(Self {
            transactions: LiveMirror::open(store, feed.clone()),
            users: LiveMirror::open(store, Query::collection(collections::USERS)),
            pager: CursorPager::new(store.clone(), feed, page_size)?,
            settlement,
        })
    }

    /// Loads the first page.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn first_page(&mut self) -> Result<TransactionPage, BackofficeError> {
        let docs = self.pager.first().await?;
        Ok(self.assemble(&docs))
    }

    /// Advances a page; `Ok(None)` when already on the last one.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn next_page(&mut self) -> Result<Option<TransactionPage>, BackofficeError> {
        Ok(self.pager.next().await?.map(|docs| self.assemble(&docs)))
    }

    /// Steps a page back; `Ok(None)` when already on the first one.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn previous_page(&mut self) -> Result<Option<TransactionPage>, BackofficeError> {
        Ok(self.pager.previous().await?.map(|docs| self.assemble(&docs)))
    }

    /// Jumps to the last page.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn last_page(&mut self) -> Result<TransactionPage, BackofficeError> {
        let docs = self.pager.last().await?;
        Ok(self.assemble(&docs))
    }

    /// Settles a transaction against this view's live snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`SettlementService::settle`] errors.
    pub async fn settle(
        &self,
        id: &DocId,
        decision: TransactionStatus,
    ) -> Result<(), BackofficeError> {
        let snapshot = self.transactions.docs();
        self.settlement.settle(&snapshot, id, decision).await
    }

    /// Waits for either mirror to change and returns the refreshed
    /// joined feed. `None` once both mirrors are gone.
    pub async fn changed(&mut self) -> Option<Vec<TransactionRow>> {
        tokio::select! {
            state = self.transactions.changed() => state.map(|s| join_rows(&s.docs, &self.users.docs())),
            state = self.users.changed() => {
                state.map(|s| join_rows(&self.transactions.docs(), &s.docs))
            }
        }
    }

    fn assemble(&self, docs: &[Document]) -> TransactionPage {
        let transactions: Vec<Transaction> = decode_all(docs);
        TransactionPage {
            rows: join_rows(&transactions, &self.users.docs()),
            page: self.pager.current_page(),
            total_pages: self.pager.total_pages(),
            total: self.pager.total_count(),
        }
    }
}
