use crate::middleware::auth::UserExtractor;
use crate::models::auth::AuthenticatedUser;
use axum::{
    extract::Request,
    http::{Method, Uri},
    middleware::Next,
    response::Response,
};

/// Row-level filtering for lesson reads.
///
/// Non-admin `GET /lessons` and `GET /lessons/{id}` are redirected to the
/// SQL functions that only return lessons visible to the caller. Returns the
/// replacement path and query, or `None` to leave the request alone.
pub fn rewrite_lesson_request(method: &Method, path: &str, user: &AuthenticatedUser) -> Option<String> {
    if *method != Method::GET || !path.starts_with("/lessons") || user.is_admin() {
        return None;
    }

    let user_id = urlencoding::encode(&user.user_id);

    if path == "/lessons" {
        return Some(format!("/rpc/get_lessons_for_user?p_user_id={}", user_id));
    }

    let lesson_id = path.strip_prefix("/lessons/")?;
    if !lesson_id.is_empty() && lesson_id.bytes().all(|b| b.is_ascii_digit()) {
        return Some(format!(
            "/rpc/get_lesson_by_id?p_user_id={}&p_lesson_id={}",
            user_id, lesson_id
        ));
    }

    None
}

pub async fn lesson_access_middleware(mut request: Request, next: Next) -> Response {
    let rewritten = request
        .user()
        .and_then(|user| rewrite_lesson_request(request.method(), request.uri().path(), user));

    if let Some(path_and_query) = rewritten {
        match path_and_query.parse::<Uri>() {
            Ok(uri) => {
                tracing::info!("[LESSON-ACCESS] Redirecting to filtered function: {}", path_and_query);
                *request.uri_mut() = uri;
            }
            Err(e) => tracing::warn!("Could not rewrite lesson request to {}: {}", path_and_query, e),
        }
    }

    next.run(request).await
}
