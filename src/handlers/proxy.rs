// src/handlers/proxy.rs
use crate::errors::ApiError;
use crate::middleware::auth::auth_middleware;
use crate::middleware::lesson_access::lesson_access_middleware;
use crate::models::auth::AuthenticatedUser;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Extension, Request},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
    Router,
};
use std::sync::Arc;

/// Everything not matched by an explicit route is authenticated, row-level
/// filtered and then forwarded to PostgREST.
pub fn proxy_routes() -> Router {
    Router::new()
        .fallback(forward_to_postgrest)
        .layer(axum::middleware::from_fn(lesson_access_middleware))
        .layer(axum::middleware::from_fn(auth_middleware))
}

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Headers sent upstream: the caller's headers minus credentials and
/// connection-level headers, plus the user context PostgREST relies on.
pub fn upstream_request_headers(
    incoming: &HeaderMap,
    path: &str,
    user: Option<&AuthenticatedUser>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in incoming {
        if is_hop_by_hop(name)
            || *name == header::AUTHORIZATION
            || *name == header::HOST
            || *name == header::CONTENT_LENGTH
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if path.starts_with("/rpc/") {
        headers.insert(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static("params=single-object"),
        );
    }

    if let Some(user) = user {
        let context: [(&'static str, &str); 3] = [
            ("x-user-id", user.user_id.as_str()),
            ("x-user-email", user.email.as_str()),
            ("x-user-role", user.role.as_str()),
        ];
        for (name, value) in context {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static(name), value);
                }
                Err(_) => tracing::warn!("Skipping non-ASCII {} header for {}", name, user.user_id),
            }
        }
    }

    headers
}

/// Headers relayed back to the client. CORS is answered by this server, so
/// upstream `access-control-*` headers are dropped along with hop-by-hop ones.
pub fn downstream_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream {
        if is_hop_by_hop(name)
            || *name == header::CONTENT_LENGTH
            || name.as_str().starts_with("access-control-")
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

pub async fn forward_to_postgrest(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();

    if path == "/api" || path.starts_with("/api/") {
        return Err(ApiError::NotFound(format!(
            "Route {} {} not found",
            parts.method, path
        )));
    }

    let user = parts.extensions.get::<AuthenticatedUser>();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path);

    let limit = state.config.max_body_bytes;
    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge(format!(
            "Request body exceeds the {} byte limit",
            limit
        )));
    }

    let body = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ApiError::Validation(format!("Could not read request body: {}", e)))?;

    tracing::info!(
        "[PROTECTED] {} {} - User: {} ({})",
        parts.method,
        path_and_query,
        user.map(|u| u.email.as_str()).unwrap_or("-"),
        user.map(|u| u.role.as_str()).unwrap_or("-")
    );

    let upstream = state
        .postgrest
        .http()
        .request(parts.method.clone(), state.postgrest.url(path_and_query))
        .headers(upstream_request_headers(&parts.headers, path, user))
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("[PROTECTED] Proxy Error: {}", e);
            ApiError::Upstream(format!(
                "Cannot connect to PostgREST at {}",
                state.postgrest.base_url()
            ))
        })?;

    let status = upstream.status();
    let headers = downstream_response_headers(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
