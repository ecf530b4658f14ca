//! WebSocket layer: live views, pagination, and settlement commands.

pub mod connection;
pub mod handler;
pub mod messages;

pub use handler::routes;
pub use messages::{WsCommand, WsMessage, WsMessageType};
