//! Feedback DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Feedback, FeedbackKind};

/// One feedback submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDto {
    /// Submission id.
    pub id: String,
    /// Category (`general`, `bug`, `feature`, `complaint`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Star rating, 1–5.
    pub rating: u8,
    /// Free-text message.
    pub message: String,
    /// Whether an operator has read it.
    pub is_read: bool,
    /// When it was marked read.
    pub read_at: Option<DateTime<Utc>>,
    /// Submitting platform.
    pub platform: Option<String>,
    /// Submission timestamp.
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&Feedback> for FeedbackDto {
    fn from(f: &Feedback) -> Self {
        Self {
            id: f.id.to_string(),
            kind: match f.kind {
                FeedbackKind::General => "general".to_string(),
                FeedbackKind::Bug => "bug".to_string(),
                FeedbackKind::Feature => "feature".to_string(),
                FeedbackKind::Complaint => "complaint".to_string(),
            },
            rating: f.rating,
            message: f.message.clone(),
            is_read: f.is_read,
            read_at: f.read_at,
            platform: f.platform.clone(),
            timestamp: f.timestamp,
        }
    }
}
