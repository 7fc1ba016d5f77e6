//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::attendance::models::{AttendanceRecord, UpdateAttendanceRequest};
use crate::gateway::handlers::HealthResponse;
use crate::reservations::models::{Reservation, ReservationRequest};
use crate::tasks::models::{CreateTaskRequest, Task, UpdateTaskRequest};
use crate::user_auth::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, RegisterResponse,
    RegistrationOutcome,
};

/// Bearer token issued by `/api/v1/login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let mut scheme = Http::new(HttpAuthScheme::Bearer);
            scheme.bearer_format = Some("JWT".to_string());
            scheme.description = Some("Authorization: Bearer <token from /api/v1/login>".to_string());
            components.add_security_scheme("bearer_jwt", SecurityScheme::Http(scheme));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Ledger API",
        version = "1.0.0",
        description = "Authenticated daily attendance ledger with personal tasks and shared reservations."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        // Public
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        // Authenticated
        crate::user_auth::handlers::change_password,
        crate::user_auth::handlers::delete_account,
        crate::attendance::handlers::get_today,
        crate::attendance::handlers::get_monthly,
        crate::attendance::handlers::start,
        crate::attendance::handlers::end,
        crate::attendance::handlers::update,
        crate::tasks::handlers::list_tasks,
        crate::tasks::handlers::create_task,
        crate::tasks::handlers::update_task,
        crate::tasks::handlers::delete_task,
        crate::reservations::handlers::list_reservations,
        crate::reservations::handlers::create_reservation,
        crate::reservations::handlers::update_reservation,
        crate::reservations::handlers::delete_reservation,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            RegisterResponse,
            RegistrationOutcome,
            LoginRequest,
            AuthResponse,
            ChangePasswordRequest,
            AttendanceRecord,
            UpdateAttendanceRequest,
            Task,
            CreateTaskRequest,
            UpdateTaskRequest,
            Reservation,
            ReservationRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login (no auth required)"),
        (name = "User", description = "Account management (auth required)"),
        (name = "Attendance", description = "Daily clock-in/clock-out ledger (auth required)"),
        (name = "Tasks", description = "Personal tasks (auth required)"),
        (name = "Reservations", description = "Shared reservation calendar (auth required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
