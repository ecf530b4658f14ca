//! Tournament and category DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Category, Tournament};
use crate::service::{CategoryDraft, TournamentDraft};

/// Query parameters for `GET /tournaments`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TournamentListParams {
    /// Case-insensitive term matched against name and category
    /// reference. Empty or absent matches everything.
    #[serde(default)]
    pub search: Option<String>,
}

/// Query parameters for `GET /categories`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CategoryListParams {
    /// Case-insensitive term matched against name and description.
    /// Empty or absent matches everything.
    #[serde(default)]
    pub search: Option<String>,
}

/// Request body for `POST /tournaments`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
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
    /// Banner image URL from the upload endpoint.
    #[serde(default)]
    pub image: Option<String>,
}

impl From<CreateTournamentRequest> for TournamentDraft {
    fn from(req: CreateTournamentRequest) -> Self {
        Self {
            name: req.name,
            category_id: req.category_id,
            entry_fee: req.entry_fee,
            prize_pool: req.prize_pool,
            total_slots: req.total_slots,
            image: req.image,
        }
    }
}

/// One tournament as shown in the console.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDto {
    /// Tournament id.
    pub id: String,
    /// Tournament name.
    pub name: String,
    /// Category reference.
    pub category_id: String,
    /// Entry fee in coins.
    pub entry_fee: i64,
    /// Prize pool in coins.
    pub prize_pool: i64,
    /// Slot capacity.
    pub total_slots: u32,
    /// Number of booked slots.
    pub booked_count: u32,
    /// Whether the app shows the tournament.
    pub is_active: bool,
    /// Whether room credentials have been sent.
    pub has_room: bool,
    /// Banner image URL.
    pub image: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Tournament> for TournamentDto {
    fn from(t: &Tournament) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            category_id: t.category_id.clone(),
            entry_fee: t.entry_fee,
            prize_pool: t.prize_pool,
            total_slots: t.total_slots,
            booked_count: u32::try_from(t.booked_slots.len()).unwrap_or(u32::MAX),
            is_active: t.is_active,
            has_room: t.room_id.is_some(),
            image: t.image.clone(),
            created_at: t.created_at,
        }
    }
}

/// Request body for `PATCH /tournaments/{id}/room`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdateRequest {
    /// Room id players join.
    pub room_id: String,
    /// Room password.
    pub pass: String,
}

/// Request body for `PATCH /tournaments/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TournamentStatusRequest {
    /// New visibility flag.
    pub active: bool,
}

/// Request body for `POST /categories`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// Category name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl From<CreateCategoryRequest> for CategoryDraft {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            image: req.image,
        }
    }
}

/// One category.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    /// Category id.
    pub id: String,
    /// Category name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Image URL.
    pub image: Option<String>,
}

impl From<&Category> for CategoryDto {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            description: c.description.clone(),
            image: c.image.clone(),
        }
    }
}
