use crate::errors::ApiError;
use crate::middleware::auth::UserExtractor;
use axum::{extract::Request, middleware::Next, response::Response};

/// Route-level guard for endpoints that are admin-only regardless of the
/// admin route table. Must run after `auth_middleware`.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.user() {
        Some(user) if user.is_admin() => {
            tracing::debug!("✓ Admin access granted: {}", user.email);
            Ok(next.run(request).await)
        }
        Some(_) => Err(ApiError::Forbidden(
            "Admin access required for this operation".to_string(),
        )),
        None => Err(ApiError::Unauthorized("User not authenticated".to_string())),
    }
}
