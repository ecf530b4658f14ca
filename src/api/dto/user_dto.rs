//! User roster DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::User;

/// Query parameters for `GET /users`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserListParams {
    /// Case-insensitive term matched against email, in-game name, and
    /// in-game UID. Empty or absent matches everyone.
    #[serde(default)]
    pub search: Option<String>,
}

/// One roster entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// User id.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Display name inside the game.
    pub in_game_name: String,
    /// In-game UID shown to tournament hosts.
    #[serde(rename = "inGameUID")]
    pub in_game_uid: String,
    /// Coin balance.
    pub coins: i64,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Tournaments won counter.
    pub won_tournaments: u32,
    /// Signup timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            in_game_name: user.in_game_name.clone(),
            in_game_uid: user.in_game_uid.clone(),
            coins: user.coins,
            is_active: user.is_active,
            won_tournaments: user.won_tournaments,
            created_at: user.created_at,
        }
    }
}

/// Request body for `PATCH /users/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserStatusRequest {
    /// New active flag.
    pub active: bool,
}
