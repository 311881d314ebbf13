use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Structured access log for every request, tagged with a request id that is
/// also returned to the client in `X-Request-Id`.
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 64)
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();
    let remote_addr = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        user_agent = %user_agent,
        remote_addr = %remote_addr,
        "incoming request"
    );

    let mut response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    match status {
        500..=599 => tracing::error!(
            request_id = %request_id, method = %method, uri = %uri, status, duration_ms,
            "request completed (server error)"
        ),
        400..=499 => tracing::warn!(
            request_id = %request_id, method = %method, uri = %uri, status, duration_ms,
            "request completed (client error)"
        ),
        _ => tracing::info!(
            request_id = %request_id, method = %method, uri = %uri, status, duration_ms,
            "request completed"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
