//! # arena-backoffice
//!
//! Administrative back office for a mobile tournament platform. All
//! durable state lives in an external document store; this service is
//! a realtime synchronization and pagination layer between that store
//! and the operator console.
//!
//! ## Architecture
//!
//! ```text
//! Operator console (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Views (ws/)
//!     │
//!     ├── IdentityGate, LiveMirror, CursorPager,
//!     │   Settlement, MoreScreen, FeedbackBridge (service/)
//!     │
//!     ├── Store: Memory | Postgres (store/)
//!     │
//!     └── Image host + email templates (outbound/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod outbound;
pub mod service;
pub mod store;
pub mod ws;
