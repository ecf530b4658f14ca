//! Image upload boundary.
//!
//! Banner and proof images are hosted by an external media service.
//! The uploader posts the raw bytes with an unsigned preset and hands
//! the resulting secure URL back; documents only ever store that URL.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::BackofficeConfig;
use crate::error::BackofficeError;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Client for the external image host.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    client: reqwest::Client,
    url: String,
    preset: String,
}

impl ImageUploader {
    /// Builds the uploader from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &BackofficeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.upload_url.clone(),
            preset: config.upload_preset.clone(),
        }
    }

    /// Uploads one image and returns its secure URL.
    ///
    /// # Errors
    ///
    /// Returns [`BackofficeError::Upload`] when the request fails, the
    /// host rejects it, or the response carries no URL.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackofficeError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| BackofficeError::Upload(e.to_string()))?;
        let form = Form::new()
            .text("upload_preset", self.preset.clone())
            .part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackofficeError::Upload(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BackofficeError::Upload(format!(
                "image host answered {}",
                response.status()
            )));
        }
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| BackofficeError::Upload(e.to_string()))?;
        tracing::debug!(url = %body.secure_url, "image uploaded");
        Ok(body.secure_url)
    }
}
