use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use std::sync::Arc;

use super::models::{
    AuthResponse, AuthenticatedUser, ChangePasswordRequest, LoginRequest, RegisterRequest,
    RegisterResponse,
};
use crate::error::ServiceError;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, created, ok};

/// Map axum's body rejection into the shared envelope
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    body.map(|Json(v)| v)
        .map_err(|e| ServiceError::validation(format!("Invalid request body: {}", e.body_text())))
}

/// Same as [`json_body`] for a numeric `{id}` segment
pub(crate) fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ServiceError> {
    id.map(|Path(v)| v)
        .map_err(|e| ServiceError::validation(format!("Invalid path parameter: {}", e.body_text())))
}

/// Register a new user
///
/// POST /api/v1/register
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered or reactivated", body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Empty email or password"),
        (status = 409, description = "An active account already uses this email")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let req = json_body(body)?;
    let (user_id, outcome) = state.credentials.register(&req.email, &req.password).await?;
    created(RegisterResponse { user_id, outcome })
}

/// Login user
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let req = json_body(body)?;
    let account = state
        .credentials
        .verify(&req.email, &req.password)
        .await
        .inspect_err(|e| tracing::warn!("Login failed: {}", e))?;

    let (token, claims) = state
        .tokens
        .issue(&account.email)
        .map_err(|e| ServiceError::internal(e.to_string()))?;

    ok(AuthResponse {
        token,
        email: account.email,
        expires_at: claims.exp,
    })
}

/// Change password
///
/// PUT /api/v1/user/password
#[utoipa::path(
    put,
    path = "/api/v1/user/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Old password wrong or not authenticated"),
        (status = 404, description = "Identity no longer exists")
    ),
    security(("bearer_jwt" = [])),
    tag = "User"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<()> {
    let req = json_body(body)?;
    state
        .credentials
        .change_password(&user.email, &req.old_password, &req.new_password)
        .await?;
    ok(())
}

/// Delete (tombstone) the caller's account
///
/// DELETE /api/v1/user
#[utoipa::path(
    delete,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Identity no longer exists")
    ),
    security(("bearer_jwt" = [])),
    tag = "User"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<()> {
    state.credentials.tombstone(&user.email).await?;
    ok(())
}
