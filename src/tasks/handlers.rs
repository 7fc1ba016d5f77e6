use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use super::models::{CreateTaskRequest, Task, UpdateTaskRequest};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, created, ok};
use crate::user_auth::AuthenticatedUser;
use crate::user_auth::handlers::{json_body, path_id};

/// List the caller's tasks
///
/// GET /api/v1/tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "Caller's tasks", body = ApiResponse<Vec<Task>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Tasks"
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Task>> {
    ok(state.tasks.list(&user.email).await?)
}

/// Create a task
///
/// POST /api/v1/tasks
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = ApiResponse<Task>),
        (status = 400, description = "Invalid title"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Tasks"
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<Task> {
    let req = json_body(body)?;
    created(state.tasks.create(&user.email, req).await?)
}

/// Update title and/or completion
///
/// PUT /api/v1/tasks/{id}
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = ApiResponse<Task>),
        (status = 400, description = "Invalid body"),
        (status = 404, description = "No such task for this user")
    ),
    security(("bearer_jwt" = [])),
    tag = "Tasks"
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Task> {
    let id = path_id(id)?;
    let req = json_body(body)?;
    ok(state.tasks.update(&user.email, id, req).await?)
}

/// Delete a task
///
/// DELETE /api/v1/tasks/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 404, description = "No such task for this user")
    ),
    security(("bearer_jwt" = [])),
    tag = "Tasks"
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;
    state.tasks.delete(&user.email, id).await?;
    ok(())
}
