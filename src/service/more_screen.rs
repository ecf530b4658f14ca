//! More-screen menu editor.
//!
//! The mobile app's "more" screen menu is a single ordered list stored
//! inside one config document. Every edit loads the list, applies the
//! change in memory, renumbers positions to stay dense and 1-based,
//! and writes the whole document back.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{MenuItemKind, MoreScreenConfig, MoreScreenItem, collections};
use crate::error::BackofficeError;
use crate::store::{Query, Store};

/// Operator input for creating or editing a menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDraft {
    /// Title line.
    pub title: String,
    /// Subtitle line.
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
    /// Whether the item expands inline.
    #[serde(default)]
    pub is_expandable: bool,
}

/// Direction for [`MoreScreenService::move_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards position 1.
    Up,
    /// Towards the end of the list.
    Down,
}

/// Whole-document editor for the more-screen menu.
#[derive(Debug, Clone)]
pub struct MoreScreenService {
    store: Store,
}

impl MoreScreenService {
    /// Creates the editor over the given store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Loads the config document. A missing document yields an empty
    /// list rather than an error, so a fresh deployment starts blank.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Store`] on backend failure.
    pub async fn load(&self) -> Result<MoreScreenConfig, BackofficeError> {
        let docs = self
            .store
            .get_once(&Query::collection(collections::MORE_SCREEN))
            .await?;
        let Some(doc) = docs
            .iter()
            .find(|d| d.id.as_str() == collections::MORE_SCREEN_DOC)
        else {
            return Ok(MoreScreenConfig::default());
        };
        let mut config: MoreScreenConfig = doc.decode()?;
        config.items.sort_by_key(|item| item.order);
        Ok(config)
    }

    /// Appends a new item at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] for an invalid draft,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn add_item(&self, draft: MenuItemDraft) -> Result<MoreScreenItem, BackofficeError> {
        validate_draft(&draft)?;
        let mut config = self.load().await?;
        let item = MoreScreenItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title,
            subtitle: draft.subtitle,
            icon: draft.icon,
            color: draft.color,
            kind: draft.kind,
            navigation_target: draft.navigation_target,
            content: draft.content,
            is_visible: true,
            is_expandable: draft.is_expandable,
            order: u32::try_from(config.items.len()).unwrap_or(u32::MAX).saturating_add(1),
            last_updated: Some(now_stamp()),
        };
        config.items.push(item.clone());
        self.save(config).await?;
        Ok(item)
    }

    /// Replaces an item's editable fields, keeping its position and
    /// visibility.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] for an invalid draft,
    /// [`BackofficeError::NotFound`] for an unknown item,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn edit_item(
        &self,
        id: &str,
        draft: MenuItemDraft,
    ) -> Result<MoreScreenItem, BackofficeError> {
        validate_draft(&draft)?;
        let mut config = self.load().await?;
        let Some(item) = config.items.iter_mut().find(|i| i.id == id) else {
            return Err(BackofficeError::not_found(collections::MORE_SCREEN, id));
        };
        item.title = draft.title;
        item.subtitle = draft.subtitle;
        item.icon = draft.icon;
        item.color = draft.color;
        item.kind = draft.kind;
        item.navigation_target = draft.navigation_target;
        item.content = draft.content;
        item.is_expandable = draft.is_expandable;
        item.last_updated = Some(now_stamp());
        let updated = item.clone();
        self.save(config).await?;
        Ok(updated)
    }

    /// Removes an item and closes the gap in the ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] for an unknown item,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn delete_item(&self, id: &str) -> Result<(), BackofficeError> {
        let mut config = self.load().await?;
        let before = config.items.len();
        config.items.retain(|i| i.id != id);
        if config.items.len() == before {
            return Err(BackofficeError::not_found(collections::MORE_SCREEN, id));
        }
        renumber(&mut config.items);
        self.save(config).await
    }

    /// Flips whether the app renders the item.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] for an unknown item,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn toggle_visibility(&self, id: &str) -> Result<MoreScreenItem, BackofficeError> {
        let mut config = self.load().await?;
        let Some(item) = config.items.iter_mut().find(|i| i.id == id) else {
            return Err(BackofficeError::not_found(collections::MORE_SCREEN, id));
        };
        item.is_visible = !item.is_visible;
        item.last_updated = Some(now_stamp());
        let updated = item.clone();
        self.save(config).await?;
        Ok(updated)
    }

    /// Swaps an item with its neighbor. Moving the first item up or
    /// the last item down is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::NotFound`] for an unknown item,
    /// [`BackofficeError::Store`] on backend failure.
    pub async fn move_item(&self, id: &str, direction: MoveDirection) -> Result<(), BackofficeError> {
        let mut config = self.load().await?;
        let Some(pos) = config.items.iter().position(|i| i.id == id) else {
            return Err(BackofficeError::not_found(collections::MORE_SCREEN, id));
        };
        let target = match direction {
            MoveDirection::Up => {
                let Some(target) = pos.checked_sub(1) else {
                    return Ok(());
                };
                target
            }
            MoveDirection::Down => {
                if pos + 1 >= config.items.len() {
                    return Ok(());
                }
                pos + 1
            }
        };
        config.items.swap(pos, target);
        renumber(&mut config.items);
        self.save(config).await
    }

    async fn save(&self, mut config: MoreScreenConfig) -> Result<(), BackofficeError> {
        config.last_updated = Some(now_stamp());
        let fields = serde_json::to_value(&config)
            .map_err(|e| BackofficeError::Write(e.to_string()))?;
        self.store
            .set_doc(
                collections::MORE_SCREEN,
                collections::MORE_SCREEN_DOC,
                fields,
            )
            .await
    }
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}

/// Reassigns positions 1..=N in list order.
fn renumber(items: &mut [MoreScreenItem]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.order = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
    }
}

fn validate_draft(draft: &MenuItemDraft) -> Result<(), BackofficeError> {
    if draft.title.trim().is_empty() {
        return Err(BackofficeError::Validation("title is required".to_string()));
    }
    if draft.subtitle.trim().is_empty() {
        return Err(BackofficeError::Validation(
            "subtitle is required".to_string(),
        ));
    }
    match draft.kind {
        MenuItemKind::Navigate | MenuItemKind::Action | MenuItemKind::Link => {
            if draft.navigation_target.trim().is_empty() {
                return Err(BackofficeError::Validation(
                    "navigation target is required for this item type".to_string(),
                ));
            }
        }
        MenuItemKind::Toggle => {
            if draft.content.trim().is_empty() {
                return Err(BackofficeError::Validation(
                    "content is required for toggle items".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn draft(title: &str) -> MenuItemDraft {
        MenuItemDraft {
            title: title.to_string(),
            subtitle: format!("{title} subtitle"),
            icon: "list-outline".to_string(),
            color: "#112233".to_string(),
            kind: MenuItemKind::Navigate,
            navigation_target: "Wallet".to_string(),
            content: String::new(),
            is_expandable: false,
        }
    }

    async fn service_with(names: &[&str]) -> MoreScreenService {
        let service = MoreScreenService::new(Store::memory());
        for name in names {
            service
                .add_item(draft(name))
                .await
                .unwrap_or_else(|e| panic!("add {name}: {e}"));
        }
        service
    }

    fn titles(config: &MoreScreenConfig) -> Vec<String> {
        config.items.iter().map(|i| i.title.clone()).collect()
    }

    fn orders(config: &MoreScreenConfig) -> Vec<u32> {
        config.items.iter().map(|i| i.order).collect()
    }

    #[tokio::test]
    async fn missing_config_loads_as_empty() {
        let service = MoreScreenService::new(Store::memory());
        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        assert!(config.items.is_empty());
    }

    #[tokio::test]
    async fn added_items_get_dense_positions() {
        let service = service_with(&["A", "B", "C"]).await;
        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(titles(&config), ["A", "B", "C"]);
        assert_eq!(orders(&config), [1, 2, 3]);
        assert!(config.last_updated.is_some());
    }

    #[tokio::test]
    async fn draft_validation_rejects_missing_fields() {
        let service = MoreScreenService::new(Store::memory());

        let mut missing_title = draft("X");
        missing_title.title = "  ".to_string();
        assert!(matches!(
            service.add_item(missing_title).await,
            Err(BackofficeError::Validation(_))
        ));

        let mut toggle_without_content = draft("X");
        toggle_without_content.kind = MenuItemKind::Toggle;
        assert!(matches!(
            service.add_item(toggle_without_content).await,
            Err(BackofficeError::Validation(_))
        ));

        let mut link_without_target = draft("X");
        link_without_target.kind = MenuItemKind::Link;
        link_without_target.navigation_target = String::new();
        assert!(matches!(
            service.add_item(link_without_target).await,
            Err(BackofficeError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_closes_the_ordering_gap() {
        let service = service_with(&["A", "B", "C"]).await;
        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        let Some(middle) = config.items.get(1) else {
            panic!("expected three items");
        };
        service
            .delete_item(&middle.id)
            .await
            .unwrap_or_else(|e| panic!("delete: {e}"));

        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(titles(&config), ["A", "C"]);
        assert_eq!(orders(&config), [1, 2]);
    }

    #[tokio::test]
    async fn move_swaps_neighbors_and_renumbers() {
        let service = service_with(&["A", "B", "C"]).await;
        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        let Some(last) = config.items.last() else {
            panic!("expected items");
        };
        service
            .move_item(&last.id, MoveDirection::Up)
            .await
            .unwrap_or_else(|e| panic!("move: {e}"));

        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(titles(&config), ["A", "C", "B"]);
        assert_eq!(orders(&config), [1, 2, 3]);
    }

    #[tokio::test]
    async fn boundary_moves_are_silent_no_ops() {
        let service = service_with(&["A", "B"]).await;
        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        let Some(first) = config.items.first() else {
            panic!("expected items");
        };
        let Some(last) = config.items.last() else {
            panic!("expected items");
        };

        service
            .move_item(&first.id, MoveDirection::Up)
            .await
            .unwrap_or_else(|e| panic!("move up: {e}"));
        service
            .move_item(&last.id, MoveDirection::Down)
            .await
            .unwrap_or_else(|e| panic!("move down: {e}"));

        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(titles(&config), ["A", "B"]);
    }

    #[tokio::test]
    async fn toggle_flips_visibility() {
        let service = service_with(&["A"]).await;
        let config = service.load().await.unwrap_or_else(|e| panic!("{e}"));
        let Some(item) = config.items.first() else {
            panic!("expected an item");
        };
        assert!(item.is_visible);

        let toggled = service
            .toggle_visibility(&item.id)
            .await
            .unwrap_or_else(|e| panic!("toggle: {e}"));
        assert!(!toggled.is_visible);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let service = service_with(&["A"]).await;
        assert!(matches!(
            service.delete_item("nope").await,
            Err(BackofficeError::NotFound { .. })
        ));
        assert!(matches!(
            service.edit_item("nope", draft("B")).await,
            Err(BackofficeError::NotFound { .. })
        ));
    }
}
