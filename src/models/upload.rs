use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    #[serde(rename = "base64Image", default)]
    pub base64_image: Option<String>,
}

/// Subset of the FreeImage.host upload response we care about.
#[derive(Debug, Deserialize)]
pub struct FreeImageResponse {
    pub status_code: u16,
    #[serde(default)]
    pub image: Option<FreeImageImage>,
    #[serde(default)]
    pub error: Option<FreeImageError>,
}

#[derive(Debug, Deserialize)]
pub struct FreeImageImage {
    pub url: String,
    pub display_url: String,
}

#[derive(Debug, Deserialize)]
pub struct FreeImageError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub success: bool,
    pub url: String,
    pub display_url: String,
}
