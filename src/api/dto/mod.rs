//! Request and response DTOs for the REST surface.

pub mod auth_dto;
pub mod common_dto;
pub mod feedback_dto;
pub mod more_screen_dto;
pub mod tournament_dto;
pub mod transaction_dto;
pub mod user_dto;

pub use auth_dto::{LoginRequest, LoginResponse};
pub use common_dto::MessageResponse;
pub use feedback_dto::FeedbackDto;
pub use more_screen_dto::{MenuItemDto, MenuItemRequest, MenuListResponse, MoveItemRequest};
pub use tournament_dto::{
    CategoryDto, CategoryListParams, CreateCategoryRequest, CreateTournamentRequest,
    RoomUpdateRequest, TournamentDto, TournamentListParams, TournamentStatusRequest,
};
pub use transaction_dto::{TransactionListParams, TransactionRowDto};
pub use user_dto::{UserDto, UserListParams, UserStatusRequest};
