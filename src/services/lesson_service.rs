// Lesson operations on top of the PostgREST lesson functions

use crate::models::auth::AuthenticatedUser;
use crate::models::lesson::{CreatedLesson, Lesson, LessonFilter, LessonPayload, UpdatedLesson};
use crate::postgrest_client::{PostgrestClient, PostgrestError};
use serde_json::{json, Value};

pub struct LessonService<'a> {
    postgrest: &'a PostgrestClient,
}

impl<'a> LessonService<'a> {
    pub fn new(postgrest: &'a PostgrestClient) -> Self {
        Self { postgrest }
    }

    /// Lessons visible to `user`: admins see every lesson, everyone else
    /// only what `get_lessons_for_user` returns for them.
    pub async fn list(&self, user: &AuthenticatedUser, filter: &LessonFilter) -> Result<Vec<Lesson>, PostgrestError> {
        let lessons: Vec<Lesson> = if user.is_admin() {
            self.postgrest
                .rpc_rows("get_all_lessons_with_content", &json!({}))
                .await?
        } else {
            self.postgrest
                .rpc_rows("get_lessons_for_user", &json!({ "p_user_id": user.user_id }))
                .await?
        };

        Ok(lessons.into_iter().filter(|l| filter.matches(l)).collect())
    }

    /// `Ok(None)` when the lesson does not exist or `user` may not see it.
    pub async fn get_for(&self, user: &AuthenticatedUser, lesson_id: i64) -> Result<Option<Lesson>, PostgrestError> {
        if user.is_admin() {
            return self.get(lesson_id).await;
        }

        let lessons: Vec<Lesson> = self
            .postgrest
            .rpc_rows(
                "get_lesson_by_id",
                &json!({ "p_user_id": user.user_id, "p_lesson_id": lesson_id }),
            )
            .await?;

        Ok(lessons.into_iter().next())
    }

    /// Unfiltered read, used on the admin-only write paths.
    pub async fn get(&self, lesson_id: i64) -> Result<Option<Lesson>, PostgrestError> {
        let lessons: Vec<Lesson> = self
            .postgrest
            .rpc_rows("get_lesson_with_content", &json!({ "p_lesson_id": lesson_id }))
            .await?;

        Ok(lessons.into_iter().next())
    }

    /// Returns the id of the new lesson.
    pub async fn create(&self, token: &str, payload: &LessonPayload) -> Result<Option<i64>, PostgrestError> {
        let created: Vec<CreatedLesson> = self
            .postgrest
            .rpc_rows("create_lesson_with_content", &payload.to_rpc_params(token, None))
            .await?;

        Ok(created.first().map(|c| c.new_lesson_id))
    }

    /// Partial update: unspecified fields keep their current value.
    /// `Ok(None)` when the lesson does not exist.
    pub async fn update(
        &self,
        token: &str,
        lesson_id: i64,
        payload: &LessonPayload,
    ) -> Result<Option<Lesson>, PostgrestError> {
        let current = match self.get(lesson_id).await? {
            Some(lesson) => lesson,
            None => return Ok(None),
        };

        let merged = payload.merged_over(&current);
        let updated: Vec<UpdatedLesson> = self
            .postgrest
            .rpc_rows("update_lesson_with_content", &merged.to_rpc_params(token, Some(lesson_id)))
            .await?;

        if updated.is_empty() {
            return Ok(None);
        }
        tracing::info!("Lesson {} updated", updated[0].updated_lesson_id);

        self.get(lesson_id).await
    }

    pub async fn delete(&self, token: &str, lesson_id: i64) -> Result<bool, PostgrestError> {
        let result = self
            .postgrest
            .rpc_value("delete_lesson", &json!({ "p_token": token, "p_lesson_id": lesson_id }))
            .await?;

        // `delete_lesson` returns a boolean, sometimes wrapped in a one-row array.
        let deleted = match result {
            Value::Bool(b) => b,
            Value::Array(rows) => rows.first().map(|v| v.as_bool().unwrap_or(true)).unwrap_or(false),
            Value::Null => false,
            _ => true,
        };
        Ok(deleted)
    }
}
