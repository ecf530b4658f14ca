//! User roster operations.

use serde_json::json;

use crate::domain::{User, collections};
use crate::error::BackofficeError;
use crate::store::Store;

/// Operator actions on the user roster.
#[derive(Debug, Clone)]
pub struct RosterService {
    store: Store,
}

impl RosterService {
    /// Creates the service over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Sets a user's active flag. Inactive users cannot sign in to the
    /// app; nothing else about the account changes.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] for an unknown user,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), BackofficeError> {
        self.store
            .write_doc(collections::USERS, id, json!({ "isActive": active }))
            .await?;
        tracing::info!(user = id, active, "user status changed");
        Ok(())
    }

    /// Deletes a user document. Historical transactions keep pointing
    /// at the removed id and render with an unknown owner.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn delete(&self, id: &str) -> Result<(), BackofficeError> {
        self.store.delete_doc(collections::USERS, id).await?;
        tracing::info!(user = id, "user deleted");
        Ok(())
    }
}

/// Case-insensitive roster search over email, in-game name, and
/// in-game UID. An empty term matches everyone.
#[must_use]
pub fn search_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    let needle = term.trim().to_lowercase();
    users
        .iter()
        .filter(|user| {
            needle.is_empty()
                || user.email.to_lowercase().contains(&needle)
                || user.in_game_name.to_lowercase().contains(&needle)
                || user.in_game_uid.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::DocId;
    use crate::store::Query;

    fn user(id: &str, email: &str, name: &str, uid: &str) -> User {
        User {
            id: DocId::new(id),
            email: email.to_string(),
            in_game_name: name.to_string(),
            in_game_uid: uid.to_string(),
            coins: 0,
            is_active: true,
            won_tournaments: 0,
            created_at: None,
        }
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let users = vec![
            user("u1", "Ace@Example.com", "Shadow", "55001"),
            user("u2", "bob@example.com", "Bolt", "55002"),
        ];

        let by_email = search_users(&users, "ACE@");
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email.first().map(|u| u.id.as_str()), Some("u1"));

        let by_name = search_users(&users, "bolt");
        assert_eq!(by_name.first().map(|u| u.id.as_str()), Some("u2"));

        let by_uid = search_users(&users, "5500");
        assert_eq!(by_uid.len(), 2);

        assert_eq!(search_users(&users, "").len(), 2);
        assert!(search_users(&users, "zzz").is_empty());
    }

    #[tokio::test]
    async fn set_active_flips_only_the_flag() {
        let store = Store::memory();
        store
            .set_doc(
                collections::USERS,
                "u1",
                serde_json::json!({
                    "email": "a@b.c",
                    "inGameName": "ace",
                    "coins": 700,
                }),
            )
            .await
            .unwrap_or_else(|e| panic!("seed: {e}"));

        RosterService::new(store.clone())
            .set_active("u1", false)
            .await
            .unwrap_or_else(|e| panic!("set_active: {e}"));

        let docs = store
            .get_once(&Query::collection(collections::USERS))
            .await
            .unwrap_or_else(|e| panic!("read back: {e}"));
        let users: Vec<User> = crate::store::decode_all(&docs);
        let Some(u) = users.first() else {
            panic!("user vanished");
        };
        assert!(!u.is_active);
        assert_eq!(u.coins, 700, "other fields untouched");
    }

    #[tokio::test]
    async fn toggling_an_unknown_user_is_not_found() {
        let store = Store::memory();
        let result = RosterService::new(store).set_active("ghost", true).await;
        assert!(matches!(result, Err(BackofficeError::NotFound { .. })));
    }
}
