use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use super::models::{Reservation, ReservationRequest};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, created, ok};
use crate::user_auth::AuthenticatedUser;
use crate::user_auth::handlers::{json_body, path_id};

/// All reservations on the shared calendar
///
/// GET /api/v1/reservations
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    responses(
        (status = 200, description = "Reservations ordered by start", body = ApiResponse<Vec<Reservation>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Reservations"
)]
pub async fn list_reservations(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Reservation>> {
    ok(state.reservations.list().await?)
}

/// Book a slot
///
/// POST /api/v1/reservations
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<Reservation>),
        (status = 400, description = "Empty title or start not before end"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_jwt" = [])),
    tag = "Reservations"
)]
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<ReservationRequest>, JsonRejection>,
) -> ApiResult<Reservation> {
    let req = json_body(body)?;
    created(state.reservations.create(&user.email, req).await?)
}

/// Replace a reservation the caller owns
///
/// PUT /api/v1/reservations/{id}
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation ID")),
    request_body = ReservationRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ApiResponse<Reservation>),
        (status = 400, description = "Empty title or start not before end"),
        (status = 404, description = "No such reservation for this user")
    ),
    security(("bearer_jwt" = [])),
    tag = "Reservations"
)]
pub async fn update_reservation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ReservationRequest>, JsonRejection>,
) -> ApiResult<Reservation> {
    let id = path_id(id)?;
    let req = json_body(body)?;
    ok(state.reservations.update(&user.email, id, req).await?)
}

/// Cancel a reservation the caller owns
///
/// DELETE /api/v1/reservations/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled"),
        (status = 404, description = "No such reservation for this user")
    ),
    security(("bearer_jwt" = [])),
    tag = "Reservations"
)]
pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;
    state.reservations.delete(&user.email, id).await?;
    ok(())
}
