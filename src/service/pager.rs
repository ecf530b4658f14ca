//! Cursor-based pagination over an ordered store query.
//!
//! Pages are anchored by opaque cursors derived from the last document
//! of each page, so navigation stays stable while other rows churn.
//! Backward navigation replays a stack of trailing cursors, one per
//! page already visited.

use crate::error::BackofficeError;
use crate::store::{Cursor, Document, Query, Store};

/// Stateful pager over one ordered query.
#[derive(Debug)]
pub struct CursorPager {
    store: Store,
    query: Query,
    page_size: u32,
    total: u64,
    /// 1-based page number, 0 until the first page is loaded.
    current_page: u64,
    /// Length of the page currently shown.
    last_len: usize,
    /// Trailing cursor of the current page.
    trailing: Option<Cursor>,
    /// Trailing cursors of the pages before the current one.
    history: Vec<Cursor>,
}

impl CursorPager {
    /// Creates a pager. The query must carry an `order_by`; its limit
    /// and cursor, if any, are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] if the query is
    /// unordered, since cursors cannot be derived without a sort key.
    pub fn new(store: Store, query: Query, page_size: u32) -> Result<Self, BackofficeError> {
        if query.order().is_none() {
            return Err(BackofficeError::Validation(
                "paginated queries must be ordered".to_string(),
            ));
        }
        Ok(Self {
            store,
            query: query.unanchored(),
            page_size,
            total: 0,
            current_page: 0,
            last_len: 0,
            trailing: None,
            history: Vec::new(),
        })
    }

    /// Loads the first page and refreshes the total row count.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn first(&mut self) -> Result<Vec<Document>, BackofficeError> {
        self.total = self.store.count_once(&self.query).await?;
        let docs = self.fetch(None).await?;
        self.history.clear();
        self.current_page = 1;
        self.adopt(&docs);
        Ok(docs)
    }

    /// Advances one page. Returns `Ok(None)` without moving when the
    /// current page is not full or the next page turns out empty.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn next(&mut self) -> Result<Option<Vec<Document>>, BackofficeError> {
        if self.current_page == 0 || self.last_len < self.page_size as usize {
            return Ok(None);
        }
        let Some(anchor) = self.trailing.clone() else {
            return Ok(None);
        };
        let docs = self.fetch(Some(anchor.clone())).await?;
        if docs.is_empty() {
            return Ok(None);
        }
        self.history.push(anchor);
        self.current_page += 1;
        self.adopt(&docs);
        Ok(Some(docs))
    }

    /// Steps one page back. Returns `Ok(None)` when already on the
    /// first page or nothing is loaded yet.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn previous(&mut self) -> Result<Option<Vec<Document>>, BackofficeError> {
        if self.current_page <= 1 {
            return Ok(None);
        }
        self.history.pop();
        let anchor = self.history.last().cloned();
        let docs = self.fetch(anchor).await?;
        self.current_page = self.history.len() as u64 + 1;
        self.adopt(&docs);
        Ok(docs.into())
    }

    /// Jumps to the last page. The trailing-cursor history cannot be
    /// reconstructed for a jump, so it is cleared; a later `previous`
    /// lands back on the first page.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn last(&mut self) -> Result<Vec<Document>, BackofficeError> {
        self.total = self.store.count_once(&self.query).await?;
        if self.total == 0 {
            return self.first().await;
        }
        let remainder = self.total % u64::from(self.page_size);
        let tail_len = if remainder == 0 {
            self.page_size
        } else {
            u32::try_from(remainder).unwrap_or(self.page_size)
        };
        // Fetched in reverse order, flipped back for display.
        let reversed = self.query.clone().reversed().limit(tail_len);
        let mut docs = self.store.get_once(&reversed).await?;
        docs.reverse();
        self.history.clear();
        self.current_page = self.total_pages();
        self.adopt(&docs);
        Ok(docs)
    }

    /// 1-based number of the page currently shown, 0 before `first`.
    #[must_use]
    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    /// Total matching rows as of the last `first` or `last` call.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Number of pages implied by the last known total.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }

    async fn fetch(&self, anchor: Option<Cursor>) -> Result<Vec<Document>, BackofficeError> {
        let mut query = self.query.clone().limit(self.page_size);
        if let Some(cursor) = anchor {
            query = query.start_after(cursor);
        }
        self.store.get_once(&query).await
    }

    fn adopt(&mut self, docs: &[Document]) {
        self.last_len = docs.len();
        self.trailing = match (docs.last(), self.query.order()) {
            (Some(doc), Some(order)) => Some(doc.cursor(order)),
            _ => None,
        };
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::collections;
    use crate::store::Direction;

    async fn seed(store: &Store, count: u32) {
        for n in 0..count {
            store
                .set_doc(
                    collections::TRANSACTIONS,
                    &format!("t{n:03}"),
                    json!({
                        "type": "deposit",
                        "amount": 10 * i64::from(n),
                        "userId": "u1",
                        "status": "pending",
                        "timestamp": format!("2026-01-01T00:00:{:02}Z", n % 60),
                    }),
                )
                .await
                .unwrap_or_else(|e| panic!("seed failed: {e}"));
        }
    }

    fn pager(store: &Store, page_size: u32) -> CursorPager {
        let query = Query::collection(collections::TRANSACTIONS)
            .order_by("amount", Direction::Descending);
        match CursorPager::new(store.clone(), query, page_size) {
            Ok(p) => p,
            Err(e) => panic!("pager construction failed: {e}"),
        }
    }

    fn ids(docs: &[Document]) -> Vec<String> {
        docs.iter().map(|d| d.id.to_string()).collect()
    }

    #[tokio::test]
    async fn unordered_query_is_rejected() {
        let store = Store::memory();
        let result = CursorPager::new(
            store,
            Query::collection(collections::TRANSACTIONS),
            12,
        );
        assert!(matches!(result, Err(BackofficeError::Validation(_))));
    }

    #[tokio::test]
    async fn first_next_previous_round_trip() {
        let store = Store::memory();
        seed(&store, 30).await;
        let mut pager = pager(&store, 12);

        let page1 = pager.first().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(page1.len(), 12);
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.total_count(), 30);
        assert_eq!(pager.total_pages(), 3);

        let Some(page2) = pager.next().await.unwrap_or_else(|e| panic!("{e}")) else {
            panic!("expected a second page");
        };
        assert_eq!(page2.len(), 12);
        assert_eq!(pager.current_page(), 2);

        let Some(page3) = pager.next().await.unwrap_or_else(|e| panic!("{e}")) else {
            panic!("expected a third page");
        };
        assert_eq!(page3.len(), 6);
        assert_eq!(pager.current_page(), 3);

        // The short final page stops forward navigation.
        assert!(pager.next().await.unwrap_or_else(|e| panic!("{e}")).is_none());
        assert_eq!(pager.current_page(), 3);

        let Some(back2) = pager.previous().await.unwrap_or_else(|e| panic!("{e}")) else {
            panic!("expected to step back");
        };
        assert_eq!(ids(&back2), ids(&page2));
        assert_eq!(pager.current_page(), 2);

        let Some(back1) = pager.previous().await.unwrap_or_else(|e| panic!("{e}")) else {
            panic!("expected to reach the first page");
        };
        assert_eq!(ids(&back1), ids(&page1));
        assert_eq!(pager.current_page(), 1);

        assert!(pager.previous().await.unwrap_or_else(|e| panic!("{e}")).is_none());
    }

    #[tokio::test]
    async fn last_lands_on_the_short_tail() {
        let store = Store::memory();
        seed(&store, 30).await;
        let mut pager = pager(&store, 12);
        pager.first().await.unwrap_or_else(|e| panic!("{e}"));

        let tail = pager.last().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(tail.len(), 6);
        assert_eq!(pager.current_page(), 3);

        // Display order must match walking forward page by page.
        let mut forward = pager;
        forward.first().await.unwrap_or_else(|e| panic!("{e}"));
        forward.next().await.unwrap_or_else(|e| panic!("{e}"));
        let Some(walked) = forward.next().await.unwrap_or_else(|e| panic!("{e}")) else {
            panic!("expected the third page");
        };
        assert_eq!(ids(&tail), ids(&walked));
    }

    #[tokio::test]
    async fn last_on_exact_multiple_shows_a_full_page() {
        let store = Store::memory();
        seed(&store, 24).await;
        let mut pager = pager(&store, 12);
        let tail = pager.last().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(tail.len(), 12);
        assert_eq!(pager.current_page(), 2);
    }

    #[tokio::test]
    async fn next_before_first_is_a_no_op() {
        let store = Store::memory();
        seed(&store, 5).await;
        let mut pager = pager(&store, 12);
        assert!(pager.next().await.unwrap_or_else(|e| panic!("{e}")).is_none());
        assert!(pager.previous().await.unwrap_or_else(|e| panic!("{e}")).is_none());
    }
}
