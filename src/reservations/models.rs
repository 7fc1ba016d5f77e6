use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// A booked slot on the shared calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub user_email: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for both create and full-replacement update
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_window"))]
pub struct ReservationRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    #[schema(example = "Meeting room A")]
    pub title: String,
    /// RFC 3339
    #[schema(example = "2024-02-01T01:00:00Z")]
    pub start_time: DateTime<Utc>,
    /// RFC 3339, strictly after `startTime`
    #[schema(example = "2024-02-01T02:00:00Z")]
    pub end_time: DateTime<Utc>,
}

impl ReservationRequest {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            ..self
        }
    }
}

fn validate_window(req: &ReservationRequest) -> Result<(), ValidationError> {
    if req.start_time >= req.end_time {
        let mut err = ValidationError::new("window");
        err.message = Some("startTime must be before endTime".into());
        return Err(err);
    }
    Ok(())
}
