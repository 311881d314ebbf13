use crate::errors::ApiError;
use crate::middleware::rbac::is_admin_route;
use crate::models::auth::AuthenticatedUser;
use crate::services::token_verifier::{extract_bearer, token_fingerprint, AuthError};
use crate::AppState;
use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Resolves the bearer token to a user, enforces the admin route table and
/// attaches the [`AuthenticatedUser`] to the request extensions.
pub async fn auth_middleware(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = match state.verifier.verify_token(token).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(token = %token_fingerprint(token), "rejected invalid or expired token");
            return Err(ApiError::Unauthorized(AuthError::InvalidToken.to_string()));
        }
        Err(e) => {
            tracing::error!("Auth error: {}", e);
            return Err(ApiError::Unauthorized(e.to_string()));
        }
    };

    if is_admin_route(request.method(), request.uri().path()) && !user.is_admin() {
        tracing::warn!(
            user = %user.email,
            method = %request.method(),
            path = %request.uri().path(),
            "admin route denied"
        );
        return Err(ApiError::Forbidden(
            "Admin access required for this operation".to_string(),
        ));
    }

    tracing::debug!("✓ Authenticated: {} ({})", user.email, user.role.as_str());

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extension trait to easily extract the caller from request extensions
pub trait UserExtractor {
    fn user(&self) -> Option<&AuthenticatedUser>;
}

impl UserExtractor for Request {
    fn user(&self) -> Option<&AuthenticatedUser> {
        self.extensions().get::<AuthenticatedUser>()
    }
}
