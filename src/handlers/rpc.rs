// src/handlers/rpc.rs
use crate::errors::ApiError;
use crate::handlers::proxy::forward_to_postgrest;
use crate::middleware::auth::auth_middleware;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::Extension,
    handler::Handler,
    http::StatusCode,
    response::Json,
    routing::{post, MethodRouter},
    Router,
};
use serde_json::Value;
use std::sync::Arc;

/// PostgREST functions called directly (JSON in, JSON out) instead of
/// through the streaming proxy. Only POST is relayed; any other method on
/// these paths goes through the authenticated proxy like an unmatched path.
pub fn rpc_routes() -> Router {
    // The POST is public, the proxied methods are not.
    let public = Router::new()
        .route("/rpc/verify_login", public_relay("verify_login"))
        .route("/rpc/register_user", public_relay("register_user"));

    // Admin checks for the write functions come from the admin route table.
    let protected = Router::new()
        .route("/rpc/get_lesson_with_content", relay_or_forward("get_lesson_with_content"))
        .route("/rpc/get_all_lessons_with_content", relay_or_forward("get_all_lessons_with_content"))
        .route("/rpc/create_lesson_with_content", relay_or_forward("create_lesson_with_content"))
        .route("/rpc/update_lesson_with_content", relay_or_forward("update_lesson_with_content"))
        .layer(axum::middleware::from_fn(auth_middleware));

    public.merge(protected)
}

fn relay(function: &'static str) -> MethodRouter {
    post(move |Extension(state): Extension<Arc<AppState>>, body: Bytes| async move {
        relay_rpc(&state, function, &body).await
    })
}

fn relay_or_forward(function: &'static str) -> MethodRouter {
    relay(function).fallback(forward_to_postgrest)
}

fn public_relay(function: &'static str) -> MethodRouter {
    relay(function).fallback(forward_to_postgrest.layer(axum::middleware::from_fn(auth_middleware)))
}

/// Parse the request body as JSON; an empty body becomes `{}`.
pub fn rpc_params(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
}

async fn relay_rpc(
    state: &AppState,
    function: &'static str,
    body: &[u8],
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let params = rpc_params(body)?;

    let response = state.postgrest.rpc(function, &params).await.map_err(|e| {
        tracing::error!("Error calling PostgREST {}: {}", function, e);
        ApiError::Upstream(e.to_string())
    })?;

    Ok((response.status, Json(response.body)))
}
