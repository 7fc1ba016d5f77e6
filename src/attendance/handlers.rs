//! Attendance endpoints. Identity always comes from the auth gate.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};

use super::models::{AttendanceRecord, MonthlyQuery, UpdateAttendanceRequest};
use crate::error::ServiceError;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, ok};
use crate::user_auth::AuthenticatedUser;
use crate::user_auth::handlers::json_body;

/// Today's record, or `data: null` when nothing was recorded yet
///
/// GET /api/v1/attendance
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "Today's record or null", body = ApiResponse<AttendanceRecord>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Attendance"
)]
pub async fn get_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Option<AttendanceRecord>> {
    ok(state.ledger.get_today(&user.email).await?)
}

/// Records for one month, ascending by date
///
/// GET /api/v1/attendance/monthly?month=2&year=2024
#[utoipa::path(
    get,
    path = "/api/v1/attendance/monthly",
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Records for the month", body = ApiResponse<Vec<AttendanceRecord>>),
        (status = 400, description = "Missing or out-of-range month/year"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Attendance"
)]
pub async fn get_monthly(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<MonthlyQuery>, QueryRejection>,
) -> ApiResult<Vec<AttendanceRecord>> {
    let Query(q) = query
        .map_err(|e| ServiceError::validation(format!("Invalid query: {}", e.body_text())))?;
    ok(state.ledger.get_monthly(&user.email, q.month, q.year).await?)
}

/// Clock in
///
/// POST /api/v1/attendance/start
#[utoipa::path(
    post,
    path = "/api/v1/attendance/start",
    responses(
        (status = 200, description = "Started record", body = ApiResponse<AttendanceRecord>),
        (status = 400, description = "Start already recorded today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Attendance"
)]
pub async fn start(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<AttendanceRecord> {
    ok(state.ledger.start(&user.email).await?)
}

/// Clock out
///
/// POST /api/v1/attendance/end
#[utoipa::path(
    post,
    path = "/api/v1/attendance/end",
    responses(
        (status = 200, description = "Completed record", body = ApiResponse<AttendanceRecord>),
        (status = 400, description = "Not started, or end already recorded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No record for today")
    ),
    security(("bearer_jwt" = [])),
    tag = "Attendance"
)]
pub async fn end(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<AttendanceRecord> {
    ok(state.ledger.end(&user.email).await?)
}

/// Manual correction for any date
///
/// POST /api/v1/attendance/update
#[utoipa::path(
    post,
    path = "/api/v1/attendance/update",
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Upserted record", body = ApiResponse<AttendanceRecord>),
        (status = 400, description = "Unparseable date or time"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Attendance"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<UpdateAttendanceRequest>, JsonRejection>,
) -> ApiResult<AttendanceRecord> {
    let req = json_body(body)?;
    let record = state
        .ledger
        .update(
            &user.email,
            &req.date,
            req.start_time.as_deref(),
            req.end_time.as_deref(),
            &req.comment,
        )
        .await?;
    ok(record)
}
