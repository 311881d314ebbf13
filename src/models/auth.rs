use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Only the exact stored value `admin` grants admin rights.
    pub fn from_db(value: &str) -> Self {
        if value == "admin" {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// The caller resolved from a bearer token, attached to request extensions.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    /// Role exactly as stored, relayed to PostgREST in `X-User-Role`.
    pub role: String,
    pub token_expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub token: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        Role::from_db(&self.role) == Role::Admin
    }
}

/// Row produced by the `verify_token` SQL function.
#[derive(Debug, Clone, FromRow, Deserialize)]
pub struct TokenRow {
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub user_role: String,
    pub token_expires_at: DateTime<Utc>,
}

impl TokenRow {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at < now
    }

    pub fn into_user(self, token: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: self.user_id,
            email: self.user_email,
            name: self.user_name,
            role: self.user_role,
            token_expires_at: self.token_expires_at,
            token: token.to_string(),
        }
    }
}

/// Same columns as [`TokenRow`] but as PostgREST serialises them; timestamps
/// may arrive without an offset when the column is `timestamp`.
#[derive(Debug, Deserialize)]
pub struct TokenRowJson {
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub user_role: String,
    pub token_expires_at: String,
}

impl TokenRowJson {
    pub fn into_row(self) -> Option<TokenRow> {
        Some(TokenRow {
            token_expires_at: parse_timestamp(&self.token_expires_at)?,
            user_id: self.user_id,
            user_email: self.user_email,
            user_name: self.user_name,
            user_role: self.user_role,
        })
    }
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres text output for timestamptz: "2025-01-01 10:00:00+00"
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Row returned by `/rpc/verify_login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub user_role: String,
    #[serde(default)]
    pub user_created_at: Option<String>,
    pub access_token: String,
    pub expires_at: String,
}

/// Row returned by `/rpc/register_user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub user_role: String,
    #[serde(default)]
    pub user_created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserResponse,
    #[serde(rename = "expiresAt")]
    pub expires_at: String,
}

impl From<AccessToken> for LoginData {
    fn from(row: AccessToken) -> Self {
        LoginData {
            token: row.access_token,
            user: UserResponse {
                user_id: row.user_id,
                email: row.user_email,
                name: row.user_name,
                role: row.user_role,
            },
            expires_at: row.expires_at,
        }
    }
}
