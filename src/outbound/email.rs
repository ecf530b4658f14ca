//! Feedback email delivery.
//!
//! New feedback submissions are forwarded to the operators through a
//! hosted email template service. The mailer renders the template
//! parameters (stars, category label, message) and posts them; it
//! keeps no state of its own.

use serde::Serialize;
use serde_json::json;

use crate::config::BackofficeConfig;
use crate::domain::{Feedback, FeedbackKind};
use crate::error::BackofficeError;
use crate::service::FeedbackNotifier;

/// Client for the hosted email template service.
#[derive(Debug, Clone)]
pub struct FeedbackMailer {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct TemplateParams {
    rating_stars: String,
    feedback_type: String,
    message: String,
    platform: String,
    submitted_at: String,
}

impl FeedbackMailer {
    /// Builds the mailer from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &BackofficeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.email_endpoint.clone(),
            service_id: config.email_service_id.clone(),
            template_id: config.email_template_id.clone(),
            public_key: config.email_public_key.clone(),
        }
    }
}

impl FeedbackNotifier for FeedbackMailer {
    async fn notify(&self, feedback: &Feedback) -> Result<(), BackofficeError> {
        let payload = json!({
            "service_id": self.service_id,
            "template_id": self.template_id,
            "user_id": self.public_key,
            "template_params": template_params(feedback),
        });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackofficeError::Notification(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BackofficeError::Notification(format!(
                "email service answered {}",
                response.status()
            )));
        }
        tracing::info!(feedback = %feedback.id, "feedback email sent");
        Ok(())
    }
}

fn template_params(feedback: &Feedback) -> TemplateParams {
    TemplateParams {
        rating_stars: star_string(feedback.rating),
        feedback_type: kind_label(feedback.kind).to_string(),
        message: feedback.message.clone(),
        platform: feedback
            .platform
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        submitted_at: feedback
            .timestamp
            .map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339()),
    }
}

/// Five-slot star bar, filled up to the (clamped) rating.
fn star_string(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    let mut stars = "\u{2605}".repeat(filled);
    stars.push_str(&"\u{2606}".repeat(5 - filled));
    stars
}

const fn kind_label(kind: FeedbackKind) -> &'static str {
    match kind {
        FeedbackKind::General => "General Feedback",
        FeedbackKind::Bug => "Bug Report",
        FeedbackKind::Feature => "Feature Request",
        FeedbackKind::Complaint => "Complaint",
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::DocId;

    #[test]
    fn star_bar_fills_and_clamps() {
        assert_eq!(star_string(0), "\u{2606}\u{2606}\u{2606}\u{2606}\u{2606}");
        assert_eq!(star_string(3), "\u{2605}\u{2605}\u{2605}\u{2606}\u{2606}");
        assert_eq!(star_string(9), "\u{2605}\u{2605}\u{2605}\u{2605}\u{2605}");
    }

    #[test]
    fn template_params_render_labels_and_fallbacks() {
        let feedback = Feedback {
            id: DocId::new("f1"),
            kind: FeedbackKind::Bug,
            rating: 2,
            message: "crashes on launch".to_string(),
            is_read: false,
            read_at: None,
            platform: None,
            app_version: None,
            device_info: None,
            timestamp: None,
        };
        let params = template_params(&feedback);
        assert_eq!(params.feedback_type, "Bug Report");
        assert_eq!(params.rating_stars, "\u{2605}\u{2605}\u{2606}\u{2606}\u{2606}");
        assert_eq!(params.platform, "unknown");
        assert_eq!(params.submitted_at, "unknown");
    }
}
