// src/handlers/lessons.rs
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::middleware::admin::admin_middleware;
use crate::middleware::auth::auth_middleware;
use crate::models::api::ApiResponse;
use crate::models::auth::AuthenticatedUser;
use crate::models::lesson::{Lesson, LessonFilter, LessonPayload};
use crate::services::lesson_service::LessonService;
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub fn lesson_routes() -> Router {
    let read = Router::new()
        .route("/api/lessons", get(list_lessons))
        .route("/api/lessons/:id", get(get_lesson))
        .layer(axum::middleware::from_fn(auth_middleware));

    let write = Router::new()
        .route("/api/lessons", post(create_lesson))
        .route("/api/lessons/:id", put(update_lesson).delete(delete_lesson))
        .layer(axum::middleware::from_fn(admin_middleware))
        .layer(axum::middleware::from_fn(auth_middleware));

    read.merge(write)
}

fn parse_lesson_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::Validation("Invalid lesson ID".to_string()))
}

async fn list_lessons(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filter): Query<LessonFilter>,
) -> Result<Json<ApiResponse<Vec<Lesson>>>, ApiError> {
    let lessons = LessonService::new(&state.postgrest).list(&user, &filter).await?;
    Ok(Json(ApiResponse::ok(lessons)))
}

async fn get_lesson(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Lesson>>, ApiError> {
    let lesson_id = parse_lesson_id(&id)?;

    LessonService::new(&state.postgrest)
        .get_for(&user, lesson_id)
        .await?
        .map(|lesson| Json(ApiResponse::ok(lesson)))
        .ok_or_else(|| ApiError::NotFound("Lesson not found or access denied".to_string()))
}

async fn create_lesson(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(payload): ApiJson<LessonPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Lesson>>), ApiError> {
    if !payload.has_required_fields() {
        return Err(ApiError::Validation("Title and content are required".to_string()));
    }

    let service = LessonService::new(&state.postgrest);
    let lesson_id = service
        .create(&user.token, &payload)
        .await?
        .ok_or_else(|| ApiError::Internal("Failed to create lesson".to_string()))?;

    tracing::info!("Lesson {} created by {}", lesson_id, user.email);

    let lesson = service
        .get(lesson_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Lesson {} was created but could not be loaded", lesson_id)))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(lesson, "Lesson created successfully")),
    ))
}

async fn update_lesson(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<LessonPayload>,
) -> Result<Json<ApiResponse<Lesson>>, ApiError> {
    let lesson_id = parse_lesson_id(&id)?;

    let lesson = LessonService::new(&state.postgrest)
        .update(&user.token, lesson_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(lesson, "Lesson updated successfully")))
}

async fn delete_lesson(
    Extension(state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let lesson_id = parse_lesson_id(&id)?;

    let deleted = LessonService::new(&state.postgrest)
        .delete(&user.token, lesson_id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Lesson not found".to_string()));
    }

    tracing::info!("Lesson {} deleted by {}", lesson_id, user.email);
    Ok(Json(ApiResponse::message("Lesson deleted successfully")))
}
