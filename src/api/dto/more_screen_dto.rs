//! More-screen menu DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{MenuItemKind, MoreScreenConfig, MoreScreenItem};
use crate::error::BackofficeError;
use crate::service::{MenuItemDraft, MoveDirection};

/// Request body for creating or editing a menu item.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRequest {
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
    /// Tap behavior (`navigate`, `action`, `toggle`, `link`).
    #[serde(default = "default_kind", rename = "type")]
    pub kind: String,
    /// Screen name, action name, or URL depending on the kind.
    #[serde(default)]
    pub navigation_target: String,
    /// Inline content for `toggle` items.
    #[serde(default)]
    pub content: String,
    /// Whether the item expands inline.
    #[serde(default)]
    pub is_expandable: bool,
}

fn default_kind() -> String {
    "navigate".to_string()
}

impl TryFrom<MenuItemRequest> for MenuItemDraft {
    type Error = BackofficeError;

    fn try_from(req: MenuItemRequest) -> Result<Self, Self::Error> {
        let kind = match req.kind.as_str() {
            "navigate" => MenuItemKind::Navigate,
            "action" => MenuItemKind::Action,
            "toggle" => MenuItemKind::Toggle,
            "link" => MenuItemKind::Link,
            other => {
                return Err(BackofficeError::Validation(format!(
                    "unknown item type '{other}'"
                )));
            }
        };
        Ok(Self {
            title: req.title,
            subtitle: req.subtitle,
            icon: req.icon,
            color: req.color,
            kind,
            navigation_target: req.navigation_target,
            content: req.content,
            is_expandable: req.is_expandable,
        })
    }
}

/// Request body for `POST /more-screen/items/{id}/move`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveItemRequest {
    /// `up` or `down`.
    pub direction: String,
}

impl MoveItemRequest {
    /// Parses the direction field.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Validation`] for anything but `up`
    /// or `down`.
    pub fn parsed(&self) -> Result<MoveDirection, BackofficeError> {
        match self.direction.as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(BackofficeError::Validation(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

/// One menu item as stored.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDto {
    /// Item id within the list.
    pub id: String,
    /// Title line.
    pub title: String,
    /// Subtitle line.
    pub subtitle: String,
    /// Icon key.
    pub icon: String,
    /// Accent color.
    pub color: String,
    /// Tap behavior.
    #[serde(rename = "type")]
    pub kind: String,
    /// Navigation target.
    pub navigation_target: String,
    /// Inline content.
    pub content: String,
    /// Whether the app renders the item.
    pub is_visible: bool,
    /// Whether the item expands inline.
    pub is_expandable: bool,
    /// 1-based display position.
    pub order: u32,
}

impl From<&MoreScreenItem> for MenuItemDto {
    fn from(item: &MoreScreenItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            icon: item.icon.clone(),
            color: item.color.clone(),
            kind: match item.kind {
                MenuItemKind::Navigate => "navigate".to_string(),
                MenuItemKind::Action => "action".to_string(),
                MenuItemKind::Toggle => "toggle".to_string(),
                MenuItemKind::Link => "link".to_string(),
            },
            navigation_target: item.navigation_target.clone(),
            content: item.content.clone(),
            is_visible: item.is_visible,
            is_expandable: item.is_expandable,
            order: item.order,
        }
    }
}

/// The full menu list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuListResponse {
    /// Ordered items.
    pub items: Vec<MenuItemDto>,
    /// Document-level last-save timestamp.
    pub last_updated: Option<String>,
}

impl From<&MoreScreenConfig> for MenuListResponse {
    fn from(config: &MoreScreenConfig) -> Self {
        Self {
            items: config.items.iter().map(MenuItemDto::from).collect(),
            last_updated: config.last_updated.clone(),
        }
    }
}
