//! Clients for external services (image host, email templates).

pub mod email;
pub mod upload;

pub use email::FeedbackMailer;
pub use upload::ImageUploader;
