//! Attendance record and request types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// One row per (user_email, work_date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub user_email: String,
    /// Calendar day in the ledger's offset
    #[schema(value_type = String, example = "2024-02-01")]
    pub work_date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a day's record sits in the start/end state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    /// Row exists (created by a correction) but has no times
    Unstarted,
    Started,
    Completed,
    /// End without start; only a correction can produce this
    EndOnly,
}

impl AttendanceRecord {
    pub fn state(&self) -> DayState {
        match (self.start_time, self.end_time) {
            (None, None) => DayState::Unstarted,
            (Some(_), None) => DayState::Started,
            (Some(_), Some(_)) => DayState::Completed,
            (None, Some(_)) => DayState::EndOnly,
        }
    }
}

/// Fields applied by a manual correction. `None` times leave the stored value alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub comment: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthlyQuery {
    #[param(example = 2)]
    pub month: u32,
    #[param(example = 2024)]
    pub year: i32,
}

/// Manual correction payload
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceRequest {
    /// `YYYY-MM-DD`
    #[schema(example = "2024-02-01")]
    pub date: String,
    /// `HH:MM`; empty or absent leaves start unchanged
    #[serde(default)]
    #[schema(example = "09:00")]
    pub start_time: Option<String>,
    /// `HH:MM`; empty or absent leaves end unchanged
    #[serde(default)]
    #[schema(example = "18:00")]
    pub end_time: Option<String>,
    /// Always replaces the stored comment
    #[serde(default)]
    pub comment: String,
}
