use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A lesson row as returned by `get_all_lessons_with_content`.
///
/// Only the fields the server filters on are typed; the remaining columns
/// (content, nested applications/questions, relevance window, ...) travel
/// through `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LessonFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl LessonFilter {
    pub fn matches(&self, lesson: &Lesson) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_title = lesson.title.to_lowercase().contains(&needle);
            let in_description = lesson
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if lesson.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        if let Some(status) = &self.status {
            if lesson.status.as_deref() != Some(status.as_str()) {
                return false;
            }
        }

        true
    }
}

/// Body of `POST /api/lessons` and `PUT /api/lessons/:id`.
///
/// Accepts the snake_case column names as well as the camelCase names the
/// front-end uses.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LessonPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    pub summary: Option<String>,
    pub applications: Option<Vec<Value>>,
    pub questions: Option<Vec<Value>>,
    #[serde(alias = "relevantStartDay")]
    pub relevant_start_day: Option<i32>,
    #[serde(alias = "relevantEndDay")]
    pub relevant_end_day: Option<i32>,
}

impl LessonPayload {
    pub fn has_required_fields(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        present(&self.title) && present(&self.content)
    }

    /// Overlay this (partial) payload on top of an existing lesson.
    pub fn merged_over(&self, current: &Lesson) -> LessonPayload {
        let extra_str = |key: &str| current.extra.get(key).and_then(Value::as_str).map(str::to_string);
        let extra_list = |key: &str| current.extra.get(key).and_then(Value::as_array).cloned();
        let extra_day = |key: &str| {
            current
                .extra
                .get(key)
                .and_then(Value::as_i64)
                .and_then(|d| i32::try_from(d).ok())
        };

        LessonPayload {
            title: self.title.clone().or_else(|| Some(current.title.clone())),
            description: self.description.clone().or_else(|| current.description.clone()),
            content: self.content.clone().or_else(|| extra_str("content")),
            category: self.category.clone().or_else(|| current.category.clone()),
            status: self.status.clone().or_else(|| current.status.clone()),
            image_url: self.image_url.clone().or_else(|| extra_str("image_url")),
            summary: self.summary.clone().or_else(|| extra_str("summary")),
            applications: self.applications.clone().or_else(|| extra_list("applications")),
            questions: self.questions.clone().or_else(|| extra_list("questions")),
            relevant_start_day: self.relevant_start_day.or_else(|| extra_day("relevant_start_day")),
            relevant_end_day: self.relevant_end_day.or_else(|| extra_day("relevant_end_day")),
        }
    }

    /// Parameters for `create_lesson_with_content` / `update_lesson_with_content`.
    pub fn to_rpc_params(&self, token: &str, lesson_id: Option<i64>) -> Value {
        let mut params = json!({
            "p_token": token,
            "p_title": self.title,
            "p_description": self.description.clone().unwrap_or_default(),
            "p_content": self.content,
            "p_category": self.category.clone().unwrap_or_default(),
            "p_status": self.status.clone().unwrap_or_else(|| "draft".to_string()),
            "p_image_url": self.image_url,
            "p_summary": self.summary,
            "p_applications": self.applications.clone().unwrap_or_default(),
            "p_questions": self.questions.clone().unwrap_or_default(),
        });

        if let Some(map) = params.as_object_mut() {
            if let Some(id) = lesson_id {
                map.insert("p_lesson_id".into(), json!(id));
            } else {
                // The update function does not take a relevance window.
                map.insert("p_relevant_start_day".into(), json!(self.relevant_start_day));
                map.insert("p_relevant_end_day".into(), json!(self.relevant_end_day));
            }
        }

        params
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatedLesson {
    pub new_lesson_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatedLesson {
    pub updated_lesson_id: i64,
}
