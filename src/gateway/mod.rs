pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;


use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::attendance::handlers as attendance;
use crate::config::GatewayConfig;
use crate::reservations::handlers as reservations;
use crate::tasks::handlers as tasks;
use crate::user_auth::handlers as auth;
use crate::user_auth::middleware::jwt_auth_middleware;
use state::AppState;

/// Request bodies are small JSON documents
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Build the full application router.
///
/// Public: register, login, health. Everything else sits behind the bearer
/// token gate.
pub fn build_router(state: Arc<AppState>, config: &GatewayConfig) -> Result<Router> {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/health", get(handlers::health_check));

    let protected_routes = Router::new()
        // Account
        .route("/user/password", put(auth::change_password))
        .route("/user", delete(auth::delete_account))
        // Attendance
        .route("/attendance", get(attendance::get_today))
        .route("/attendance/monthly", get(attendance::get_monthly))
        .route("/attendance/start", post(attendance::start))
        .route("/attendance/end", post(attendance::end))
        .route("/attendance/update", post(attendance::update))
        // Tasks
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        // Reservations
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/{id}",
            put(reservations::update_reservation).delete(reservations::delete_reservation),
        )
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let app = Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http());

    match &config.cors_allowed_origin {
        Some(origin) => Ok(app.layer(cors_layer(origin)?)),
        None => Ok(app),
    }
}

/// Single-origin CORS with credentials
fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid cors_allowed_origin: {}", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600)))
}

/// Start HTTP Gateway server
pub async fn run_server(state: Arc<AppState>, config: &GatewayConfig) -> Result<()> {
    let app = build_router(state, config)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.with_context(|| {
        format!(
            "Failed to bind to {} (port {} may already be in use)",
            addr, config.port
        )
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
