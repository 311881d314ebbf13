use crate::db;
use crate::models::api::ApiResponse;
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub const SERVICE_NAME: &str = "Learning Platform Auth Proxy";

pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn status(Extension(state): Extension<Arc<AppState>>) -> Json<ApiResponse<Value>> {
    let database = if db::test_connection(&state.db_pool).await {
        "healthy"
    } else {
        "unhealthy"
    };
    let image_upload = if state.freeimage.is_configured() {
        "configured"
    } else {
        "not configured"
    };

    Json(ApiResponse::ok(json!({
        "status": "operational",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "database": database,
        "token_verifier": state.verifier.name(),
        "postgrest_url": state.postgrest.base_url(),
        "image_upload": image_upload,
    })))
}
