// src/freeimage_client.rs
use crate::models::upload::{FreeImageResponse, UploadResult};
use base64::Engine;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No image provided")]
    MissingImage,
    #[error("Image is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),
    #[error("Image exceeds the {0} byte limit")]
    TooLarge(usize),
    #[error("{0}")]
    Rejected(String),
    #[error("Image host unavailable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct FreeImageClient {
    client: Client,
    api_key: String,
    upload_url: String,
}

/// Strips a `data:image/png;base64,` style prefix if present.
pub fn strip_data_url(image: &str) -> &str {
    let trimmed = image.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, payload)) = trimmed.split_once(',') {
            return payload;
        }
    }
    trimmed
}

/// Checks the payload decodes and returns the decoded size.
pub fn validate_base64_image(image: &str, max_bytes: usize) -> Result<usize, UploadError> {
    if image.is_empty() {
        return Err(UploadError::MissingImage);
    }
    let decoded = base64::engine::general_purpose::STANDARD.decode(image)?;
    if decoded.is_empty() {
        return Err(UploadError::MissingImage);
    }
    if decoded.len() > max_bytes {
        return Err(UploadError::TooLarge(max_bytes));
    }
    Ok(decoded.len())
}

impl FreeImageClient {
    pub fn new(api_key: String, upload_url: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_key,
            upload_url,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Upload an already validated base64 payload.
    pub async fn upload_base64(&self, image: &str) -> Result<UploadResult, UploadError> {
        info!("🖼️ Uploading image to FreeImage.host ({} base64 chars)", image.len());

        let form = [
            ("key", self.api_key.as_str()),
            ("action", "upload"),
            ("source", image),
            ("format", "json"),
        ];

        let response = self.client.post(&self.upload_url).form(&form).send().await?;
        let data: FreeImageResponse = response.json().await?;

        match (data.status_code, data.image) {
            (200, Some(image)) => Ok(UploadResult {
                success: true,
                url: image.url,
                display_url: image.display_url,
            }),
            _ => {
                let message = data
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Upload failed".to_string());
                error!("FreeImage.host rejected upload: {}", message);
                Err(UploadError::Rejected(message))
            }
        }
    }
}
