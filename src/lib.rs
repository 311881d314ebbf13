// lib.rs - Auth gate and PostgREST proxy for the learning platform
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod freeimage_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod postgrest_client;
pub mod services;

#[cfg(test)]
mod app_tests;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    Extension, Router,
};
use config::{AppConfig, VerifierKind};
use freeimage_client::FreeImageClient;
use postgrest_client::PostgrestClient;
use services::token_verifier::{DatabaseTokenVerifier, PostgrestTokenVerifier, TokenVerifier};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

// AppState holds the configuration, the Postgres pool and the upstream clients
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: sqlx::PgPool,
    pub postgrest: PostgrestClient,
    pub freeimage: FreeImageClient,
    pub verifier: Arc<dyn TokenVerifier>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, db_pool: sqlx::PgPool) -> Result<Self, reqwest::Error> {
        let postgrest = PostgrestClient::new(
            config.postgrest_url.clone(),
            Duration::from_secs(config.proxy_timeout_secs),
        )?;

        let verifier: Arc<dyn TokenVerifier> = match config.token_verifier {
            VerifierKind::Database => Arc::new(DatabaseTokenVerifier::new(db_pool.clone())),
            VerifierKind::Postgrest => Arc::new(PostgrestTokenVerifier::new(postgrest.clone())),
        };

        Self::with_verifier(config, db_pool, verifier)
    }

    pub fn with_verifier(
        config: AppConfig,
        db_pool: sqlx::PgPool,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Result<Self, reqwest::Error> {
        let postgrest = PostgrestClient::new(
            config.postgrest_url.clone(),
            Duration::from_secs(config.proxy_timeout_secs),
        )?;
        let freeimage = FreeImageClient::new(
            config.freeimage_api_key.clone(),
            config.freeimage_url.clone(),
        )?;

        Ok(AppState {
            config,
            db_pool,
            postgrest,
            freeimage,
            verifier,
            started_at: Instant::now(),
        })
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    // Origins are checked by AppConfig::validate at startup.
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
            HeaderName::from_static("prefer"),
        ])
        .max_age(Duration::from_secs(600))
}

/// Full application router. Explicit routes win; everything else falls
/// through to the authenticated PostgREST proxy.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::auth::auth_routes())
        .merge(handlers::upload::upload_routes())
        .merge(handlers::lessons::lesson_routes())
        .merge(handlers::rpc::rpc_routes())
        .merge(handlers::proxy::proxy_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ))
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(cors)
        .layer(Extension(state))
}
