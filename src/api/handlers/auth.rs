//! Authentication endpoints: sign-up, sign-in, refresh, sign-out, and the
//! current-user and admin-verification lookups.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::{CurrentUser, PublicProfile, SessionTokens, SignInResponse};
use crate::auth::session::SignUpRequest;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInBody {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Account created", body = PublicProfile),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already exists")
    ),
    tag = "auth"
)]
pub async fn sign_up_handler(
    State(state): State<ApiState>,
    Json(payload): Json<SignUpBody>,
) -> Result<(StatusCode, Json<PublicProfile>), ApiError> {
    payload.validate()?;

    let profile = state
        .session
        .sign_up(SignUpRequest {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SignInBody,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn sign_in_handler(
    State(state): State<ApiState>,
    Json(payload): Json<SignInBody>,
) -> Result<Json<SignInResponse>, ApiError> {
    payload.validate()?;

    let response = state.session.sign_in(&payload.email, &payload.password).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshBody,
    responses(
        (status = 200, description = "Session refreshed", body = SessionTokens),
        (status = 401, description = "Invalid refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<ApiState>,
    Json(payload): Json<RefreshBody>,
) -> Result<Json<SessionTokens>, ApiError> {
    payload.validate()?;

    let tokens = state.session.refresh_session(&payload.refresh_token).await?;
    Ok(Json(tokens))
}

#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = [])),
    tag = "auth"
)]
pub async fn sign_out_handler(
    State(state): State<ApiState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.session.sign_out(&current_user.auth_id).await?;
    Ok(Json(MessageResponse { message: "Signed out successfully".to_string() }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = PublicProfile),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    Extension(current_user): Extension<CurrentUser>,
) -> Json<PublicProfile> {
    Json(current_user.profile.into())
}

#[utoipa::path(
    post,
    path = "/auth/verify-admin",
    responses(
        (status = 200, description = "Caller holds an admin role", body = MessageResponse),
        (status = 401, description = "Missing token or no admin role")
    ),
    security(("bearerAuth" = [])),
    tag = "auth"
)]
pub async fn verify_admin_handler() -> Json<MessageResponse> {
    // Reaching this handler means both middleware stages passed.
    Json(MessageResponse { message: "Admin access verified".to_string() })
}
