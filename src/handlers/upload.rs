use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::freeimage_client::{strip_data_url, validate_base64_image, UploadError};
use crate::middleware::admin::admin_middleware;
use crate::middleware::auth::auth_middleware;
use crate::models::auth::AuthenticatedUser;
use crate::models::upload::{UploadImageRequest, UploadResult};
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::post, Router};
use std::sync::Arc;

pub fn upload_routes() -> Router {
    Router::new()
        .route("/api/upload-image", post(upload_image))
        .route("/api/upload/image", post(upload_image))
        .layer(axum::middleware::from_fn(admin_middleware))
        .layer(axum::middleware::from_fn(auth_middleware))
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match &err {
            UploadError::MissingImage
            | UploadError::InvalidImage(_)
            | UploadError::TooLarge(_)
            | UploadError::Rejected(_) => ApiError::Validation(err.to_string()),
            UploadError::Transport(e) => ApiError::Internal(format!("Image upload failed: {}", e)),
        }
    }
}

async fn upload_image(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(payload): ApiJson<UploadImageRequest>,
) -> Result<Json<UploadResult>, ApiError> {
    let image = strip_data_url(payload.base64_image.as_deref().unwrap_or_default());
    let size = validate_base64_image(image, state.config.max_image_bytes)?;

    if !state.freeimage.is_configured() {
        return Err(ApiError::Internal(
            "Image upload is not configured (FREEIMAGE_API_KEY)".to_string(),
        ));
    }

    tracing::info!("Image upload by {} ({} bytes)", user.email, size);

    let result = state.freeimage.upload_base64(image).await?;
    Ok(Json(result))
}
