// src/config.rs
use std::env;
use thiserror::Error;

pub const DEFAULT_POSTGREST_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_FREEIMAGE_URL: &str = "https://freeimage.host/api/1/upload";
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5174",
    "https://zlearning.vercel.app",
    "https://ui.sgk.guidestaredu.com",
    "https://api.learning-platform-app.guidestaredu.com",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration values: {0}")]
    MissingRequired(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Which backend resolves bearer tokens to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierKind {
    /// `SELECT * FROM verify_token($1)` over the connection pool.
    Database,
    /// `POST /rpc/verify_token` on PostgREST.
    Postgrest,
}

impl VerifierKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "database" | "db" | "postgres" => Some(VerifierKind::Database),
            "postgrest" | "http" => Some(VerifierKind::Postgrest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerifierKind::Database => "database",
            VerifierKind::Postgrest => "postgrest",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    /// Connection URL; `DATABASE_URL` wins over the individual parts.
    pub fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            self.name
        )
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    pub database: DatabaseConfig,
    pub postgrest_url: String,
    pub freeimage_api_key: String,
    pub freeimage_url: String,
    pub allowed_origins: Vec<String>,
    pub token_verifier: VerifierKind,
    pub proxy_timeout_secs: u64,
    pub max_body_bytes: usize,
    /// Decoded size limit for uploaded images; kept below `max_body_bytes`
    /// so oversized images get a validation error instead of a 413.
    pub max_image_bytes: usize,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Unset variables fall back to development defaults; their names are
    /// reported in a single warning so a misconfigured deployment is visible
    /// in the startup log.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing: Vec<&str> = Vec::new();
        let mut get = |key: &'static str| {
            let value = lookup(key).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(key);
            }
            value
        };

        let port = get("PORT");
        let environment = get("APP_ENV");
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let db_host = get("DB_HOST");
        let db_port = get("DB_PORT");
        let db_name = get("DB_NAME");
        let db_user = get("DB_USER");
        let db_password = get("DB_PASSWORD");
        let postgrest_url = get("POSTGREST_URL");
        let freeimage_api_key = get("FREEIMAGE_API_KEY");

        // Tuning knobs read below are not reported.
        if !missing.is_empty() {
            tracing::warn!(
                "Missing environment variables: {}. Using fallback values.",
                missing.join(", ")
            );
        }

        let environment = environment
            .or_else(|| lookup("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect());

        let token_verifier = match lookup("TOKEN_VERIFIER") {
            Some(raw) => VerifierKind::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown TOKEN_VERIFIER '{}', using database", raw);
                VerifierKind::Database
            }),
            None => VerifierKind::Database,
        };

        AppConfig {
            port: parse_or(port, 4000),
            environment,
            database: DatabaseConfig {
                url: database_url,
                host: db_host.unwrap_or_else(|| "localhost".to_string()),
                port: parse_or(db_port, 5432),
                name: db_name.unwrap_or_else(|| "learning_platform".to_string()),
                user: db_user.unwrap_or_else(|| "postgres".to_string()),
                password: db_password.unwrap_or_else(|| "postgres".to_string()),
            },
            postgrest_url: postgrest_url
                .unwrap_or_else(|| DEFAULT_POSTGREST_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            freeimage_api_key: freeimage_api_key.unwrap_or_default(),
            freeimage_url: lookup("FREEIMAGE_URL")
                .unwrap_or_else(|| DEFAULT_FREEIMAGE_URL.to_string()),
            allowed_origins,
            token_verifier,
            proxy_timeout_secs: parse_or(lookup("PROXY_TIMEOUT_SECS"), 30),
            max_body_bytes: parse_or(lookup("MAX_BODY_BYTES"), DEFAULT_MAX_BODY_BYTES),
            max_image_bytes: parse_or(lookup("MAX_IMAGE_BYTES"), DEFAULT_MAX_IMAGE_BYTES),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        if self.port == 0 {
            missing.push("port");
        }
        if self.database.url.is_none() {
            if self.database.host.is_empty() {
                missing.push("database.host");
            }
            if self.database.port == 0 {
                missing.push("database.port");
            }
            if self.database.name.is_empty() {
                missing.push("database.name");
            }
            if self.database.user.is_empty() {
                missing.push("database.user");
            }
        }
        if self.postgrest_url.is_empty() {
            missing.push("postgrestUrl");
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired(missing.join(", ")));
        }

        if reqwest::Url::parse(&self.postgrest_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "POSTGREST_URL",
                value: self.postgrest_url.clone(),
            });
        }

        for origin in &self.allowed_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(ConfigError::InvalidValue {
                    name: "ALLOWED_ORIGINS",
                    value: origin.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
