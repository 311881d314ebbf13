// Bearer token resolution against the database or PostgREST

use crate::models::auth::{AuthenticatedUser, TokenRow, TokenRowJson};
use crate::postgrest_client::PostgrestClient;
use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use serde_json::json;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header. Use: Bearer <token>")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token verification failed: {0}")]
    Backend(String),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Ok(None)` for unknown or expired tokens.
    async fn verify_token(&self, token: &str) -> Result<Option<AuthenticatedUser>, AuthError>;

    fn name(&self) -> &'static str;
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    let token = value.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)?;
    if token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Short, log-safe identifier for a token.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

fn accept_row(row: TokenRow, token: &str) -> Option<AuthenticatedUser> {
    if row.is_expired(Utc::now()) {
        tracing::debug!(token = %token_fingerprint(token), "token expired at {}", row.token_expires_at);
        return None;
    }
    Some(row.into_user(token))
}

pub struct DatabaseTokenVerifier {
    pool: PgPool,
}

impl DatabaseTokenVerifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenVerifier for DatabaseTokenVerifier {
    async fn verify_token(&self, token: &str) -> Result<Option<AuthenticatedUser>, AuthError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT user_id::text AS user_id,
                   user_email::text AS user_email,
                   user_name::text AS user_name,
                   user_role::text AS user_role,
                   token_expires_at::timestamptz AS token_expires_at
            FROM verify_token($1)
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Token verification error: {}", e);
            AuthError::Backend(e.to_string())
        })?;

        Ok(row.and_then(|row| accept_row(row, token)))
    }

    fn name(&self) -> &'static str {
        "database"
    }
}

pub struct PostgrestTokenVerifier {
    postgrest: PostgrestClient,
}

impl PostgrestTokenVerifier {
    pub fn new(postgrest: PostgrestClient) -> Self {
        Self { postgrest }
    }
}

#[async_trait]
impl TokenVerifier for PostgrestTokenVerifier {
    async fn verify_token(&self, token: &str) -> Result<Option<AuthenticatedUser>, AuthError> {
        let response = self
            .postgrest
            .rpc("verify_token", &json!({ "p_token": token }))
            .await
            .map_err(|e| {
                tracing::error!("Token verification error: {}", e);
                AuthError::Backend(e.to_string())
            })?;

        if !response.status.is_success() {
            tracing::debug!(status = %response.status, "verify_token rejected token");
            return Ok(None);
        }

        let rows: Vec<TokenRowJson> = match response.body {
            serde_json::Value::Null => Vec::new(),
            body => serde_json::from_value(body).map_err(|e| AuthError::Backend(e.to_string()))?,
        };

        Ok(rows
            .into_iter()
            .next()
            .and_then(TokenRowJson::into_row)
            .and_then(|row| accept_row(row, token)))
    }

    fn name(&self) -> &'static str {
        "postgrest"
    }
}
