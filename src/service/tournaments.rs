//! Tournament and category administration.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Category, DocId, Tournament, collections};
use crate::error::BackofficeError;
use crate::store::Store;

/// Operator input for creating a tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDraft {
    /// Tournament name.
    pub name: String,
    /// Category reference.
    pub category_id: String,
    /// Entry fee in coins.
    #[serde(default)]
    pub entry_fee: i64,
    /// Prize pool in coins.
    #[serde(default)]
    pub prize_pool: i64,
    /// Slot capacity.
    pub total_slots: u32,
    /// Banner image reference, usually a secure upload URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Operator input for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    /// Category name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,
}

/// Tournament catalog administration.
#[derive(Debug, Clone)]
pub struct TournamentService {
    store: Store,
}

impl TournamentService {
    /// Creates the service over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a tournament. Slots start empty and the tournament is
    /// immediately visible in the app.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] for an invalid draft,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn create(&self, draft: TournamentDraft) -> Result<Tournament, BackofficeError> {
        if draft.name.trim().is_empty() {
            return Err(BackofficeError::Validation("name is required".to_string()));
        }
        if draft.category_id.trim().is_empty() {
            return Err(BackofficeError::Validation(
                "category is required".to_string(),
            ));
        }
        if draft.total_slots == 0 {
            return Err(BackofficeError::Validation(
                "total slots must be positive".to_string(),
            ));
        }
        if draft.entry_fee < 0 || draft.prize_pool < 0 {
            return Err(BackofficeError::Validation(
                "fees cannot be negative".to_string(),
            ));
        }

        let tournament = Tournament {
            id: DocId::random(),
            name: draft.name,
            category_id: draft.category_id,
            entry_fee: draft.entry_fee,
            prize_pool: draft.prize_pool,
            total_slots: draft.total_slots,
            booked_slots: Vec::new(),
            is_active: true,
            room_id: None,
            pass: None,
            image: draft.image,
            created_at: Some(Utc::now()),
        };
        self.store
            .set_doc(
                collections::TOURNAMENTS,
                tournament.id.as_str(),
                encode(&tournament)?,
            )
            .await?;
        tracing::info!(tournament = %tournament.id, name = %tournament.name, "tournament created");
        Ok(tournament)
    }

    /// Sets the room id and password sent to booked players shortly
    /// before the match starts.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] for empty room fields,
    /// [`BackofficeError::NotFound`] for an unknown tournament,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn update_room(
        &self,
        id: &str,
        room_id: &str,
        pass: &str,
    ) -> Result<(), BackofficeError> {
        if room_id.trim().is_empty() || pass.trim().is_empty() {
            return Err(BackofficeError::Validation(
                "room id and password are required".to_string(),
            ));
        }
        self.store
            .write_doc(
                collections::TOURNAMENTS,
                id,
                json!({ "roomId": room_id, "pass": pass }),
            )
            .await
    }

    /// Shows or hides a tournament in the app without deleting it.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] for an unknown
    /// tournament, [`BackofficeError::Store`] on backend failure.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), BackofficeError> {
        self.store
            .write_doc(collections::TOURNAMENTS, id, json!({ "isActive": active }))
            .await
    }

    /// Deletes a tournament.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn delete(&self, id: &str) -> Result<(), BackofficeError> {
        self.store.delete_doc(collections::TOURNAMENTS, id).await?;
        tracing::info!(tournament = id, "tournament deleted");
        Ok(())
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] for a blank name,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, BackofficeError> {
        if draft.name.trim().is_empty() {
            return Err(BackofficeError::Validation("name is required".to_string()));
        }
        let category = Category {
            id: DocId::random(),
            name: draft.name,
            description: draft.description,
            image: draft.image,
            created_at: Some(Utc::now()),
        };
        self.store
            .set_doc(
                collections::CATEGORIES,
                category.id.as_str(),
                encode(&category)?,
            )
            .await?;
        Ok(category)
    }

    /// Deletes a category. Tournaments referencing it keep their
    /// `categoryId` string.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn delete_category(&self, id: &str) -> Result<(), BackofficeError> {
        self.store.delete_doc(collections::CATEGORIES, id).await
    }
}

/// Case-insensitive catalog search over tournament name and category
/// reference. An empty term matches everything.
#[must_use]
pub fn search_tournaments<'a>(tournaments: &'a [Tournament], term: &str) -> Vec<&'a Tournament> {
    let needle = term.trim().to_lowercase();
    tournaments
        .iter()
        .filter(|t| {
            needle.is_empty()
                || t.name.to_lowercase().contains(&needle)
                || t.category_id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Case-insensitive category search over name and description. An
/// empty term matches everything.
#[must_use]
pub fn search_categories<'a>(categories: &'a [Category], term: &str) -> Vec<&'a Category> {
    let needle = term.trim().to_lowercase();
    categories
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Serializes a model into store fields, dropping the injected id.
fn encode<T: serde::Serialize>(model: &T) -> Result<serde_json::Value, BackofficeError> {
    let mut value =
        serde_json::to_value(model).map_err(|e| BackofficeError::Write(e.to_string()))?;
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
    }
    Ok(value)
}
