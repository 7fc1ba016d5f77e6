use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub owner_email: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    #[schema(example = "Write weekly report")]
    pub title: String,
}

/// Partial update; absent or empty title keeps the current one
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "title must be at most 200 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl CreateTaskRequest {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
        }
    }
}

impl UpdateTaskRequest {
    /// Trim the title and drop it when nothing is left
    pub fn trimmed(self) -> Self {
        Self {
            title: self
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            completed: self.completed,
        }
    }
}
