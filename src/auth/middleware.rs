//! # Authentication Middleware
//!
//! Two-stage request gate: `authenticate` extracts and verifies the bearer
//! token and attaches the resolved [`CurrentUser`] as a request extension;
//! `require_admin` runs behind it on admin-only routes and checks the role.

use crate::api::error::ApiError;
use crate::auth::models::CurrentUser;
use crate::auth::session::SessionService;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
    Extension,
};
use tracing::warn;

/// Verify the bearer token on a request and attach the caller's identity.
pub async fn authenticate(
    State(session): State<SessionService>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // CORS preflight never carries credentials.
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let current_user = session.resolve_identity(token).await.map_err(|err| {
        warn!(error = %err, path = %request.uri().path(), "rejected bearer token");
        ApiError::unauthorized("Invalid token or insufficient permissions")
    })?;

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}

/// Reject requests whose resolved identity does not carry an admin role.
/// Must run behind [`authenticate`].
pub async fn require_admin(
    Extension(current_user): Extension<CurrentUser>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if !current_user.is_admin() {
        warn!(auth_id = %current_user.auth_id, "admin route denied");
        return Err(ApiError::unauthorized("Admin access required"));
    }
    Ok(next.run(request).await)
}
