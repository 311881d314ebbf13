use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::models::api::ApiResponse;
use crate::models::auth::{AccessToken, LoginData, LoginRequest, RegisterRequest, RegisteredUser};
use crate::postgrest_client::PostgrestError;
use crate::services::token_verifier::{extract_bearer, AuthError};
use crate::AppState;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use serde_json::json;
use std::sync::Arc;

pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/verify", post(verify_token))
        .route("/api/auth/logout", post(logout))
}

async fn login(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".to_string()));
    }

    let rows: Vec<AccessToken> = state
        .postgrest
        .rpc_rows(
            "verify_login",
            &json!({ "p_email": payload.email.trim(), "p_password": payload.password }),
        )
        .await
        .map_err(|e| match e {
            PostgrestError::Status { status, .. } if status.is_client_error() => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            other => other.into(),
        })?;

    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    tracing::info!("✓ Login: {} ({})", row.user_email, row.user_role);

    Ok(Json(ApiResponse::with_message(LoginData::from(row), "Login successful")))
}

async fn register(
    Extension(state): Extension<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredUser>>), ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() || payload.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Email, password, and name are required".to_string(),
        ));
    }

    // Self-registration never grants the admin role.
    let rows: Vec<RegisteredUser> = state
        .postgrest
        .rpc_rows(
            "register_user",
            &json!({
                "p_email": payload.email.trim(),
                "p_password": payload.password,
                "p_name": payload.name.trim(),
                "p_role": "user",
            }),
        )
        .await?;

    let user = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Validation("Registration failed".to_string()))?;

    tracing::info!("✓ Registered: {}", user.user_email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User registered successfully")),
    ))
}

async fn verify_token(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ApiResponse<crate::models::auth::AuthenticatedUser>>, ApiError> {
    let token = extract_bearer(&headers).map_err(|_| ApiError::Unauthorized("No token provided".to_string()))?;

    match state.verifier.verify_token(token).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::ok(user))),
        Ok(None) => Err(ApiError::Unauthorized(AuthError::InvalidToken.to_string())),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

/// Tokens live in the database; the client simply discards its copy.
async fn logout() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Logged out successfully"))
}
