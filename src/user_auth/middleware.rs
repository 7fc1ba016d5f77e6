use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::models::AuthenticatedUser;
use crate::error::ServiceError;
use crate::gateway::state::AppState;

/// Pull the bearer token out of `Authorization: Bearer <token>`.
/// The scheme name is matched case-insensitively.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Auth gate for every protected route.
///
/// The only place a token is parsed. Every failure is reported as a plain
/// 401 so validation detail never reaches the client.
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = extract_bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!("Missing or malformed Authorization header");
        ServiceError::Unauthorized
    })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Token rejected: {}", e);
        ServiceError::Unauthorized
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser {
            email: claims.email,
        });
    Ok(next.run(request).await)
}
